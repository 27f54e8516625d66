use std::cmp::Ordering;

/// Parsed update manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateInfo {
    /// Version advertised by the manifest
    pub version: String,
    /// Where the update archive can be downloaded
    pub url: String,
    /// Whether `version` is newer than the running version
    pub available: bool,
}

/// Parse a `version;url` manifest.
///
/// Returns `None` when the text has fewer than two `;`-separated parts.
/// Extra parts are ignored.
pub fn parse_manifest(text: &str, current_version: &str) -> Option<UpdateInfo> {
    let mut parts = text.trim().split(';');
    let version = parts.next()?.trim();
    let url = parts.next()?.trim();

    Some(UpdateInfo {
        version: version.to_string(),
        url: url.to_string(),
        available: is_newer(version, current_version),
    })
}

/// Compare dotted numeric versions.
///
/// Components are compared numerically left to right; a missing component
/// counts as zero. A remote version with a non-numeric component is never
/// newer, while a non-numeric local component counts as zero.
pub fn is_newer(remote: &str, current: &str) -> bool {
    let Some(remote) = parse_version(remote) else {
        return false;
    };
    let current: Vec<u64> = current
        .trim()
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect();

    let len = remote.len().max(current.len());
    let component = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);

    (0..len)
        .map(|i| component(&remote, i).cmp(&component(&current, i)))
        .find(|ord| *ord != Ordering::Equal)
        == Some(Ordering::Greater)
}

fn parse_version(version: &str) -> Option<Vec<u64>> {
    version
        .trim()
        .split('.')
        .map(|part| part.parse().ok())
        .collect()
}
