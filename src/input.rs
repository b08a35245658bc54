//! JSON inputs: a block list for vector mode, a layout tree for raster mode.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::annotate::ContentElement;
use crate::error::Error;
use crate::model::Block;

pub fn read_blocks(path: &Path) -> Result<Vec<Block>, Error> {
    read_json(path)
}

pub fn read_layout(path: &Path) -> Result<ContentElement, Error> {
    read_json(path)
}

pub fn parse_blocks(json: &str) -> Result<Vec<Block>, Error> {
    serde_json::from_str(json).map_err(|e| Error::InvalidInput(format!("blocks: {e}")))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Error> {
    let data = std::fs::read(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))?;
    serde_json::from_slice(&data).map_err(|e| Error::InvalidInput(format!("{}: {e}", path.display())))
}
