use std::{
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::info;
use serde::Serialize;
use serde_json::{Serializer, Value, ser::PrettyFormatter};

use crate::{RepositoryOutputFormat, RepositoryPersister, StdResult};

/// The indentation of the pretty-printed output.
const PRETTY_INDENT: &[u8] = b"    ";

/// A persister that writes the collected repositories as a JSON array to a file.
pub struct JsonFilePersister {
    path: PathBuf,

    /// Pretty-print the output
    pretty: bool,

    /// Keep the members whose value is null
    keep_nulls: bool,
}

impl JsonFilePersister {
    /// Creates a new `JsonFilePersister` writing to the given path.
    pub fn new(path: &Path, pretty: bool, keep_nulls: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
            keep_nulls,
        }
    }

    fn to_value(&self, data: &[RepositoryOutputFormat]) -> StdResult<Value> {
        let mut value = serde_json::to_value(data)?;
        if !self.keep_nulls {
            remove_nulls(&mut value);
        }

        Ok(value)
    }

    fn write(&self, value: &Value, writer: impl Write) -> StdResult<()> {
        if self.pretty {
            let mut serializer =
                Serializer::with_formatter(writer, PrettyFormatter::with_indent(PRETTY_INDENT));
            value.serialize(&mut serializer)?;
        } else {
            serde_json::to_writer(writer, value)?;
        }

        Ok(())
    }
}

/// Removes recursively the object members whose value is null.
fn remove_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            map.values_mut().for_each(remove_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(remove_nulls),
        _ => {}
    }
}

#[async_trait::async_trait]
impl RepositoryPersister for JsonFilePersister {
    async fn persist(&self, data: &[RepositoryOutputFormat]) -> StdResult<u32> {
        let value = self.to_value(data)?;
        let mut content = Vec::new();
        self.write(&value, &mut content)?;
        tokio::fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write output file {}", self.path.display()))?;
        info!(
            "Persisted {} repositories to {}",
            data.len(),
            self.path.display()
        );

        Ok(data.len() as u32)
    }
}
