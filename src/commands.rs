//! Reference-data names accepted on the command line, and lookup logic

use color_eyre::{eyre::eyre, Result};

use wrmc::cache::MasterDataKey;

#[derive(Debug, Clone)]
pub struct Dataset {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub key: MasterDataKey,
  pub description: &'static str,
}

/// All named datasets
pub const DATASETS: &[Dataset] = &[
  Dataset {
    name: "communes",
    aliases: &["xa", "commune"],
    key: MasterDataKey::Communes,
    description: "Communes (filter with -p huyenId=N)",
  },
  Dataset {
    name: "districts",
    aliases: &["huyen", "district"],
    key: MasterDataKey::Districts,
    description: "Districts",
  },
  Dataset {
    name: "basins",
    aliases: &["luu-vuc", "river-basins"],
    key: MasterDataKey::RiverBasins,
    description: "River basins",
  },
  Dataset {
    name: "construction-types",
    aliases: &["loai-ct", "ct-types"],
    key: MasterDataKey::ConstructionTypes,
    description: "Construction types",
  },
  Dataset {
    name: "aquifers",
    aliases: &["tang-chua-nuoc", "aquifer"],
    key: MasterDataKey::Aquifers,
    description: "Aquifers",
  },
  Dataset {
    name: "rivers",
    aliases: &["song", "river"],
    key: MasterDataKey::Rivers,
    description: "Rivers",
  },
  Dataset {
    name: "sub-basins",
    aliases: &["tieu-luu-vuc", "subbasins"],
    key: MasterDataKey::SubBasins,
    description: "Sub-basins",
  },
  Dataset {
    name: "license-types",
    aliases: &["loai-gp", "gp-types"],
    key: MasterDataKey::LicenseTypes,
    description: "Licence types",
  },
];

/// Get suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Dataset> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return DATASETS.iter().collect();
  }

  let mut matches: Vec<(&Dataset, u32)> = Vec::new();

  for ds in DATASETS {
    if ds.name == input_lower {
      matches.push((ds, 0));
      continue;
    }

    if ds.aliases.contains(&input_lower.as_str()) {
      matches.push((ds, 1));
      continue;
    }

    if ds.name.starts_with(&input_lower) {
      matches.push((ds, 2));
      continue;
    }

    if ds.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((ds, 3));
      continue;
    }

    if ds.name.contains(&input_lower) {
      matches.push((ds, 4));
      continue;
    }

    if ds.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((ds, 5));
    }
  }

  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(ds, _)| ds).collect()
}

/// Resolve a dataset name, alias or raw endpoint path to a cache key.
///
/// Anything containing `/` is taken as an endpoint path as-is.
pub fn resolve(input: &str) -> Result<MasterDataKey> {
  if input.contains('/') {
    return Ok(MasterDataKey::from(input));
  }

  let input_lower = input.to_lowercase();
  if let Some(ds) = DATASETS
    .iter()
    .find(|ds| ds.name == input_lower || ds.aliases.contains(&input_lower.as_str()))
  {
    return Ok(ds.key.clone());
  }

  let hints: Vec<&str> = get_suggestions(input).iter().map(|ds| ds.name).collect();
  if hints.is_empty() {
    Err(eyre!("Unknown dataset '{}'", input))
  } else {
    Err(eyre!(
      "Unknown dataset '{}'. Did you mean: {}?",
      input,
      hints.join(", ")
    ))
  }
}
