use anyhow::{Context, Result};
use std::path::Path;
use stopsnap::prelude::*;

/// Read a TOML config file, or fall back to the defaults
pub fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

/// Apply command-line overrides on top of a loaded config
pub fn apply_overrides(
    mut config: MatchConfig,
    grid_cells: Option<usize>,
    index: Option<IndexKind>,
) -> MatchConfig {
    if let Some(cells) = grid_cells {
        config.grid = GridResolution::Fixed {
            cells_x: cells,
            cells_y: cells,
        };
    }
    if let Some(index) = index {
        config.index = index;
    }
    config
}

/// Zone from `--utm-zone`, or read from the WKT of a `.prj` file
pub fn resolve_zone(zone: Option<&str>, prj: Option<&Path>) -> Result<UtmZone> {
    match (zone, prj) {
        (Some(zone), _) => zone
            .parse()
            .with_context(|| format!("Invalid UTM zone {:?}", zone)),
        (None, Some(prj)) => {
            let wkt = std::fs::read_to_string(prj)
                .with_context(|| format!("Failed to read projection file {}", prj.display()))?;
            UtmZone::from_wkt(&wkt)
                .with_context(|| format!("No UTM zone in projection file {}", prj.display()))
        }
        (None, None) => anyhow::bail!("Either --utm-zone or --prj is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), MatchConfig::default());
    }

    #[test]
    fn test_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.toml");
        std::fs::write(&path, "margin = 5.0\nindex = \"rtree\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.margin, 5.0);
        assert_eq!(config.index, IndexKind::RTree);

        let config = apply_overrides(config, Some(200), Some(IndexKind::Grid));
        assert_eq!(config.index, IndexKind::Grid);
        assert_eq!(
            config.grid,
            GridResolution::Fixed {
                cells_x: 200,
                cells_y: 200
            }
        );
        assert_eq!(config.margin, 5.0);
    }

    #[test]
    fn test_invalid_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("match.toml");
        std::fs::write(&path, "marign = 5.0\n").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_zone_sources() {
        assert_eq!(resolve_zone(Some("17N"), None).unwrap().to_string(), "17N");

        let dir = tempfile::tempdir().unwrap();
        let prj = dir.path().join("network.prj");
        std::fs::write(
            &prj,
            r#"PROJCS["WGS_1984_UTM_Zone_33S",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",10000000.0],PARAMETER["Central_Meridian",15.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#,
        )
        .unwrap();
        assert_eq!(resolve_zone(None, Some(&prj)).unwrap().to_string(), "33S");

        assert!(resolve_zone(None, None).is_err());
        assert!(resolve_zone(Some("99Q"), None).is_err());
    }
}
