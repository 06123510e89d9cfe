// Turning the `download` argument into an archive URL.

use crate::api::ApiClient;
use crate::catalog::{Catalog, CatalogSource};
use crate::error::{Error, Result};
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::debug;

fn is_http_url(arg: &str) -> bool {
    Url::parse(arg)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Work out which URL to fetch for `arg`.
///
/// With verification the argument must be a machine name present in the
/// catalog. Without it a URL is used as-is and a bare name is mapped to its
/// archive URL with no lookup.
pub fn resolve_target<S: CatalogSource + ?Sized>(
    catalog: &mut Catalog<'_, S>,
    client: &ApiClient,
    arg: &str,
    no_verify: bool,
) -> Result<String> {
    if no_verify {
        if is_http_url(arg) {
            return Ok(arg.to_string());
        }
        return Ok(client.archive_url(arg));
    }

    if is_http_url(arg) {
        return Err(Error::DownloadParamsInconsistency(arg.to_string()));
    }
    catalog.ensure_exists(arg)?;
    Ok(client.archive_url(&arg.to_lowercase()))
}

/// Resolve `arg` and save the archive in `dest_dir`.
pub fn download<S: CatalogSource + ?Sized>(
    catalog: &mut Catalog<'_, S>,
    client: &ApiClient,
    arg: &str,
    no_verify: bool,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let url = resolve_target(catalog, client, arg, no_verify)?;
    debug!(%url, no_verify, "resolved download target");
    client.download(&url, dest_dir)
}
