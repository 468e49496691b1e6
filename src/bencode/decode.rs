use super::Value;
use crate::error::{Result, TorrentError};
use std::collections::BTreeMap;

/// Decode one complete bencoded value; trailing bytes are an error.
pub fn decode(data: &[u8]) -> Result<Value> {
    let mut decoder = Decoder { data, pos: 0 };
    let value = decoder.value()?;

    if decoder.pos != data.len() {
        return Err(TorrentError::Bencode(format!(
            "{} trailing bytes after value",
            data.len() - decoder.pos
        )));
    }

    Ok(value)
}

struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    fn peek(&self) -> Result<u8> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| TorrentError::Bencode("Unexpected end of input".to_string()))
    }

    fn value(&mut self) -> Result<Value> {
        match self.peek()? {
            b'i' => self.integer(),
            b'l' => self.list(),
            b'd' => self.dict(),
            b'0'..=b'9' => Ok(Value::Bytes(self.byte_string()?)),
            c => Err(TorrentError::Bencode(format!(
                "Invalid bencode token: {}",
                c as char
            ))),
        }
    }

    fn integer(&mut self) -> Result<Value> {
        self.pos += 1; // 'i'

        let start = self.pos;
        while self.peek()? != b'e' {
            self.pos += 1;
        }

        let num = std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(|| TorrentError::Bencode("Invalid integer".to_string()))?;

        self.pos += 1; // 'e'
        Ok(Value::Integer(num))
    }

    fn byte_string(&mut self) -> Result<Vec<u8>> {
        let start = self.pos;
        while self.peek()? != b':' {
            self.pos += 1;
        }

        let len = std::str::from_utf8(&self.data[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| TorrentError::Bencode("Invalid string length".to_string()))?;

        self.pos += 1; // ':'

        if self.pos + len > self.data.len() {
            return Err(TorrentError::Bencode(
                "String length exceeds data".to_string(),
            ));
        }

        let bytes = self.data[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    fn list(&mut self) -> Result<Value> {
        self.pos += 1; // 'l'

        let mut list = Vec::new();
        while self.peek()? != b'e' {
            list.push(self.value()?);
        }

        self.pos += 1; // 'e'
        Ok(Value::List(list))
    }

    fn dict(&mut self) -> Result<Value> {
        self.pos += 1; // 'd'

        let mut dict = BTreeMap::new();
        while self.peek()? != b'e' {
            if !self.peek()?.is_ascii_digit() {
                return Err(TorrentError::Bencode(
                    "Dictionary key must be a string".to_string(),
                ));
            }
            let key = self.byte_string()?;
            let value = self.value()?;
            dict.insert(key, value);
        }

        self.pos += 1; // 'e'
        Ok(Value::Dict(dict))
    }
}
