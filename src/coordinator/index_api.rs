//! Index lifecycle API for DocumentStore
//!
//! Indexes are created under a versioned physical name and reached through
//! an alias: mapping `order` creates index `order_v1` with alias `order`.

use std::path::Path;

use serde_json::json;
use tracing::{debug, error, info};

use crate::error::{DocStoreError, Result};
use crate::metrics;
use crate::schema::DocMapping;
use crate::transport::TransportError;

use super::{observe, DocumentStore};

fn tracked<T>(operation: &'static str, result: Result<T, TransportError>) -> Result<T> {
    metrics::record_index_operation(operation, result.is_ok());
    Ok(result?)
}

impl DocumentStore {
    pub async fn index_exists(&self, index_name: &str) -> Result<bool> {
        Ok(self.transport.index_exists(index_name).await?)
    }

    pub async fn drop_index(&self, index_name: &str) -> Result<()> {
        tracked("drop", self.transport.index_delete(index_name).await)?;
        info!(index = %index_name, "Index dropped");
        Ok(())
    }

    /// Create an index with the given mapping and optionally alias it.
    ///
    /// An existing index is dropped first when `drop_create` is set, and left
    /// alone otherwise. Returns `false` when the index already existed and
    /// nothing was done.
    pub async fn create_index(
        &self,
        index_name: &str,
        alias: Option<&str>,
        mapping_json: &str,
        drop_create: bool,
    ) -> Result<bool> {
        let result = self.create_index_inner(index_name, alias, mapping_json, drop_create).await;
        observe("create_index", result)
    }

    async fn create_index_inner(
        &self,
        index_name: &str,
        alias: Option<&str>,
        mapping_json: &str,
        drop_create: bool,
    ) -> Result<bool> {
        if self.index_exists(index_name).await? {
            if !drop_create {
                debug!(index = %index_name, "Index already exists");
                return Ok(false);
            }
            self.drop_index(index_name).await?;
        }

        tracked("create", self.transport.index_create(index_name, mapping_json).await)?;
        info!(index = %index_name, "Index created");

        if let Some(alias) = alias {
            let alias_json = json!({ "actions": [ { "add": { "index": index_name, "alias": alias } } ] });
            tracked("alias", self.transport.index_alias(&alias_json.to_string()).await)?;
            info!(index = %index_name, alias = %alias, "Alias added");
        }
        Ok(true)
    }

    /// Create a versioned, aliased index for every registered mapping.
    ///
    /// Returns the number of indexes created.
    pub async fn create_indexes(&self) -> Result<usize> {
        let mut created = 0;
        for mapping in self.registry.all() {
            if self.create_mapped_index(&mapping).await? {
                created += 1;
            }
        }
        info!(created, registered = self.registry.len(), "Indexes created");
        Ok(created)
    }

    /// Create the versioned, aliased index for one registered type.
    pub async fn create_type_index(&self, type_key: &str) -> Result<bool> {
        let mapping = self
            .registry
            .get(type_key)
            .ok_or_else(|| DocStoreError::UnmappedType(type_key.to_string()))?;
        self.create_mapped_index(&mapping).await
    }

    async fn create_mapped_index(&self, mapping: &DocMapping) -> Result<bool> {
        let alias = mapping.index_name.as_str();
        let index_name = self.config.versioned_index_name(alias);
        let mapping_json = serde_json::to_string_pretty(&mapping.to_mapping_json())?;

        if let Some(dir) = &self.config.mapping_dir {
            write_mapping_file(Path::new(dir), &index_name, &mapping_json);
        }

        self.create_index(&index_name, Some(alias), &mapping_json, self.config.drop_create_indexes)
            .await
    }
}

/// Best-effort copy of a generated mapping, for inspection.
fn write_mapping_file(dir: &Path, index_name: &str, mapping_json: &str) {
    let file = dir.join(format!("{}.mapping.json", index_name));
    let result = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&file, mapping_json));
    match result {
        Ok(()) => debug!(file = %file.display(), "Wrote index mapping"),
        Err(e) => error!(error = %e, file = %file.display(), "Error trying to write index mapping"),
    }
}
