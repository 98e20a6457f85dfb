/*!
 The runtime for the application: reads the input, decodes it, and writes the export.
*/

use std::{
    fs::{read, File},
    io::{stdin, stdout, BufWriter, Read, Write},
    path::PathBuf,
};

use tracing::debug;

use plist_engine::{decode_with_options, detect_format, DecodeOptions, Value};

use crate::{
    app::{
        error::RuntimeError,
        options::{ExportType, Options, STDIN_NAME},
    },
    exporters::{Binary, Exporter, JSON, TXT, XML},
};

/// Stores the application state and handles application lifecycle
pub struct Config {
    /// App configuration options
    pub options: Options,
    /// The raw bytes of the input property list
    pub data: Vec<u8>,
}

impl Config {
    /// Create a new instance of the application by reading the input
    pub fn new(options: Options) -> Result<Config, RuntimeError> {
        let data = match &options.input {
            Some(path) => read(path).map_err(|why| RuntimeError::FileError(why, path.clone()))?,
            None => {
                let mut data = vec![];
                stdin()
                    .read_to_end(&mut data)
                    .map_err(|why| RuntimeError::FileError(why, PathBuf::from(STDIN_NAME)))?;
                data
            }
        };
        debug!("Read {} bytes of input", data.len());
        Ok(Config { options, data })
    }

    /// Build a new instance of the application from data already in memory
    #[cfg(test)]
    pub fn from_bytes(options: Options, data: Vec<u8>) -> Self {
        Config { options, data }
    }

    /// The decoder limits the user asked for
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::new().with_max_depth(self.options.max_depth)
    }

    /// Decode the input into a [`Value`] tree
    pub fn decode(&self) -> Result<Value, RuntimeError> {
        decode_with_options(&self.data, self.decode_options()).map_err(RuntimeError::PlistError)
    }

    /// Get the exporter for the requested export type
    fn exporter(&self) -> Box<dyn Exporter> {
        match self.options.export_type {
            ExportType::Binary => Box::new(Binary),
            ExportType::Xml => Box::new(XML),
            ExportType::Json => Box::new(JSON),
            ExportType::Txt => Box::new(TXT),
        }
    }

    /// Render the input in the requested export format
    pub fn render(&self) -> Result<Vec<u8>, RuntimeError> {
        if self.options.detect {
            return match detect_format(&self.data) {
                Some(format) => Ok(format!("{format}\n").into_bytes()),
                None => Err(RuntimeError::ExportError(
                    "the input is empty, so it has no format".to_string(),
                )),
            };
        }

        let value = self.decode()?;
        debug!("Exporting as {}", self.options.export_type);
        self.exporter().export(&value)
    }

    fn write(&self, bytes: &[u8]) -> Result<(), RuntimeError> {
        match &self.options.output {
            Some(path) => {
                let file =
                    File::create(path).map_err(|why| RuntimeError::FileError(why, path.clone()))?;
                let mut writer = BufWriter::new(file);
                writer
                    .write_all(bytes)
                    .and_then(|_| writer.flush())
                    .map_err(|why| RuntimeError::FileError(why, path.clone()))
            }
            None => {
                let mut writer = stdout().lock();
                writer
                    .write_all(bytes)
                    .and_then(|_| writer.flush())
                    .map_err(|why| RuntimeError::ExportError(why.to_string()))
            }
        }
    }

    /// Handles application execution
    pub fn start(&self) -> Result<(), RuntimeError> {
        let bytes = self.render()?;
        self.write(&bytes)
    }
}
