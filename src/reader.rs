use crate::error::{Error, Result};
use crate::log;
use crate::types::Game;
use crate::visitor::GameVisitor;
use pgn_reader::Reader;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use zstd::stream::read::Decoder as ZstdDecoder;

pub type PgnInput = Box<dyn Read + Send>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompressionMode {
    Plain,
    Zstd,
}

impl CompressionMode {
    /// `.zst` files are zstd-compressed, anything else is plain text.
    pub fn from_path(path: &Path) -> Self {
        let is_zstd = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zst"));
        if is_zstd { Self::Zstd } else { Self::Plain }
    }
}

fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// Reads the first game from `input`.
pub fn read_game<R: Read>(input: R) -> Result<Game> {
    let mut reader = Reader::new(input);
    let mut visitor = GameVisitor::new();

    match reader.read_game(&mut visitor) {
        Ok(Some(())) => {}
        Ok(None) => return Err(Error::NoGame),
        Err(error) => {
            let error_msg = format!("Parser-stage error: stage=read_game; error={error}");
            log::warn(&error_msg);
            if error.kind() != io::ErrorKind::InvalidData {
                return Err(Error::Read(error));
            }
            visitor.finalize_game_with_error(error_msg);
        }
    }

    let game = visitor.current_game.take().ok_or(Error::NoGame)?;
    if let Some(parse_error) = &game.parse_error {
        log::warn(format!("Game parsed with errors: {parse_error}"));
    }
    Ok(game)
}

pub fn parse_game(pgn: &str) -> Result<Game> {
    read_game(pgn.as_bytes())
}

/// Opens `path` (decoding `.zst` transparently) and reads its first game.
pub fn load_game(path: &Path) -> Result<Game> {
    let input = open_input_stream(path, CompressionMode::from_path(path))?;
    read_game(input).map_err(|err| match err {
        Error::Read(source) => Error::Io {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}
