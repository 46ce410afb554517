use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads the next line from `reader`, returning `None` at end of input or
/// on a read error.
///
/// The same reader must be passed on every call. Lines buffered past the
/// one returned stay in it for the next call.
pub async fn read_line<R>(reader: &mut R) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();

    match reader.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;

    #[tokio::test]
    async fn test_read_line_keeps_buffered_lines() {
        let input: &[u8] = b"/use a1\n/status\n/help";
        let mut reader = BufReader::new(input);

        assert_eq!(read_line(&mut reader).await.as_deref(), Some("/use a1\n"));
        assert_eq!(read_line(&mut reader).await.as_deref(), Some("/status\n"));
        assert_eq!(read_line(&mut reader).await.as_deref(), Some("/help"));
        assert_eq!(read_line(&mut reader).await, None);
    }
}
