use std::io::{ErrorKind, Read, Write};

use crate::sink::BoundedSink;
use crate::stream::{Converter, Options, StreamOutput, slices};

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: u64 },
    #[error("Line at byte {offset} does not fit in the input window")]
    LineTooLong { offset: u64 },
}

/// Streams Markdown from `reader` to HTML on `writer`.
///
/// Input is read `options.chunk_size` bytes at a time and output is written
/// whenever a sink of `options.output_capacity` bytes fills, so neither side
/// is ever held in memory as a whole. Multi-byte characters split across
/// reads are carried over to the next read.
pub fn convert<R: Read, W: Write>(
    mut reader: R,
    writer: W,
    options: &Options,
) -> Result<W, ConvertError> {
    let mut converter = Converter::new(options);
    let capacity = options.output_capacity.max(BoundedSink::MIN_CAPACITY);
    let mut output = StreamOutput::new(writer, capacity);
    let mut buf = vec![0u8; options.chunk_size.max(1)];
    let mut pending: Vec<u8> = Vec::with_capacity(buf.len() + 3);
    let mut offset: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        pending.extend_from_slice(&buf[..n]);
        let valid = valid_prefix(&pending, offset)?;
        let text = std::str::from_utf8(&pending[..valid])
            .map_err(|e| ConvertError::InvalidUtf8 {
                offset: offset + e.valid_up_to() as u64,
            })?;
        for slice in slices(text) {
            if !converter.has_room(slice.chars().count()) {
                return Err(ConvertError::LineTooLong { offset });
            }
            converter.feed_into(slice, &mut output)?;
        }
        offset += valid as u64;
        pending.drain(..valid);
    }

    if !pending.is_empty() {
        return Err(ConvertError::InvalidUtf8 { offset });
    }
    converter.finish_into(&mut output)?;
    log::debug!("converted {offset} bytes");
    Ok(output.finish()?)
}

/// Length of the longest prefix of `bytes` that is valid UTF-8, allowing an
/// incomplete character at the end.
fn valid_prefix(bytes: &[u8], offset: u64) -> Result<usize, ConvertError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.len()),
        Err(e) if e.error_len().is_none() => Ok(e.valid_up_to()),
        Err(e) => Err(ConvertError::InvalidUtf8 {
            offset: offset + e.valid_up_to() as u64,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::to_html;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const INPUT: &str = "# Über\n\nSmörgåsbord *ß* → `x`.\n\n> ÆØÅ\n";

    fn run(input: &[u8], options: &Options) -> Result<String, ConvertError> {
        let bytes = convert(input, Vec::new(), options)?;
        Ok(String::from_utf8(bytes).unwrap())
    }

    #[rstest]
    #[case(1, 32)]
    #[case(2, 33)]
    #[case(3, 64)]
    #[case(8192, 4096)]
    fn streams_like_one_shot(#[case] chunk_size: usize, #[case] output_capacity: usize) {
        let options = Options {
            chunk_size,
            output_capacity,
            ..Options::default()
        };
        assert_eq!(run(INPUT.as_bytes(), &options).unwrap(), to_html(INPUT));
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let mut input = b"abc\n".to_vec();
        input.extend_from_slice(&[0xff, b'\n']);
        match run(&input, &Options::default()) {
            Err(ConvertError::InvalidUtf8 { offset }) => assert_eq!(offset, 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truncated_character_at_end_is_invalid() {
        let input = "é".as_bytes();
        match run(&input[..1], &Options::default()) {
            Err(ConvertError::InvalidUtf8 { offset }) => assert_eq!(offset, 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(run(b"", &Options::default()).unwrap(), "");
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConvertError::InvalidUtf8 { offset: 7 }.to_string(),
            "Invalid UTF-8 at byte 7"
        );
    }
}
