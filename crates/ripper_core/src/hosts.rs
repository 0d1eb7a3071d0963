use std::collections::BTreeMap;

/// Host to occurrence count, as returned in the `hostnames` field.
///
/// The empty key stands for relative (self-referencing) links.
pub type HostCounts = BTreeMap<String, u64>;

/// Display label used for the empty host key.
pub const RELATIVE_HOST_LABEL: &str = "relative (self)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRow {
    pub host: String,
    pub count: u64,
    /// True for the row built from the empty key.
    pub relative: bool,
}

/// Turns a host mapping into display rows ordered by count, highest first.
///
/// The sort is stable, so hosts with equal counts keep the iteration order of
/// `hosts` (key order for a [`HostCounts`]).
pub fn aggregate_hosts<'a, I>(hosts: I) -> Vec<HostRow>
where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
{
    let mut rows: Vec<HostRow> = hosts
        .into_iter()
        .map(|(host, &count)| {
            if host.is_empty() {
                HostRow {
                    host: RELATIVE_HOST_LABEL.to_string(),
                    count,
                    relative: true,
                }
            } else {
                HostRow {
                    host: host.clone(),
                    count,
                    relative: false,
                }
            }
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}
