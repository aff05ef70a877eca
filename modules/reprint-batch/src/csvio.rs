//! Headerless CSV io for tweet sample files:
//! `order,createdAt,screenName,tweetId,url` per row.

use std::io::{Read, Write};

use anyhow::Result;

use reprint_common::TweetRow;

pub fn read_rows<R: Read>(reader: R) -> Result<Vec<TweetRow>> {
    let mut csv = csv::ReaderBuilder::new().has_headers(false).from_reader(reader);
    let mut rows = Vec::new();
    for row in csv.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

pub fn write_rows<W: Write>(writer: W, rows: &[TweetRow]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order: i64, id: &str) -> TweetRow {
        TweetRow {
            order,
            created_at: "Wed Mar 06 09:30:00 +0000 2019".to_string(),
            screen_name: "in_gr".to_string(),
            tweet_id: id.to_string(),
            url: format!("https://example.com/{id}"),
        }
    }

    #[test]
    fn rows_round_trip() {
        let rows = vec![row(1551864600, "1"), row(1551864601, "2")];
        let mut buf = Vec::new();
        write_rows(&mut buf, &rows).unwrap();
        assert_eq!(read_rows(buf.as_slice()).unwrap(), rows);
    }

    #[test]
    fn reads_hand_written_rows() {
        let data = "1551864600,Wed Mar 06 09:30:00 +0000 2019,in_gr,123,https://example.com/a\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tweet_id, "123");
        assert_eq!(rows[0].order, 1551864600);
    }
}
