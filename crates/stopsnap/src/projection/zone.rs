//! UTM zone identification.
//!
//! A network's planar coordinate system is named in several ways depending on
//! where the metadata comes from: shorthand ("17N"), an ESRI/OGC `.prj` WKT
//! string, or an EPSG code. All of them resolve to a [`UtmZone`].

use std::fmt;
use std::str::FromStr;

use crate::models::types::{GeoPoint, MatchError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    pub fn as_char(&self) -> char {
        match self {
            Self::North => 'N',
            Self::South => 'S',
        }
    }
}

/// A UTM zone number (1–60) and hemisphere
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

impl UtmZone {
    pub fn new(number: u8, hemisphere: Hemisphere) -> Result<Self> {
        if !(1..=60).contains(&number) {
            return Err(MatchError::Configuration(format!(
                "UTM zone {} is outside 1-60",
                number
            )));
        }
        Ok(Self { number, hemisphere })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Longitude of the zone's central meridian in degrees
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }

    /// The standard zone containing a geographic point (no Norway/Svalbard exceptions)
    pub fn containing(point: GeoPoint) -> Result<Self> {
        if !point.is_valid() {
            return Err(MatchError::Configuration(format!(
                "cannot pick a UTM zone for ({}, {})",
                point.lon, point.lat
            )));
        }
        let number = (((point.lon + 180.0) / 6.0).floor() as i64).clamp(0, 59) as u8 + 1;
        let hemisphere = if point.lat < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        Self::new(number, hemisphere)
    }

    /// WGS84 (`326zz`/`327zz`) and NAD83 (`269zz`) UTM EPSG codes
    pub fn from_epsg(code: u32) -> Result<Self> {
        let (number, hemisphere) = match code {
            32601..=32660 => (code - 32600, Hemisphere::North),
            32701..=32760 => (code - 32700, Hemisphere::South),
            26901..=26923 => (code - 26900, Hemisphere::North),
            _ => {
                return Err(MatchError::Configuration(format!(
                    "EPSG:{} is not a UTM coordinate system",
                    code
                )))
            }
        };
        Self::new(number as u8, hemisphere)
    }

    /// Read the zone out of projection WKT such as the contents of a `.prj` file
    ///
    /// The projected CRS name is tried first (`WGS_1984_UTM_Zone_17N`,
    /// `UTM zone 17N`), then any EPSG authority code.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let lower = wkt.to_ascii_lowercase();

        let mut search = lower.as_str();
        while let Some(pos) = search.find("utm") {
            search = &search[pos + 3..];
            if let Some((zone, _)) = parse_zone_suffix(search) {
                return Ok(zone);
            }
        }

        let mut search = lower.as_str();
        while let Some(pos) = search.find("\"epsg\"") {
            search = &search[pos + 6..];
            let rest = search.trim_start_matches(|c: char| c == ',' || c == ' ' || c == '"');
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            if let Ok(code) = digits.parse::<u32>() {
                if let Ok(zone) = Self::from_epsg(code) {
                    return Ok(zone);
                }
            }
        }

        Err(MatchError::Configuration(
            "no UTM zone found in projection metadata".into(),
        ))
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.hemisphere.as_char())
    }
}

/// Accepts "17N", "17 s", "UTM17N", "utm zone 17 north" and "EPSG:32617"
impl FromStr for UtmZone {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();

        if let Some(code) = lower.strip_prefix("epsg:") {
            let code = code.trim().parse().map_err(|_| {
                MatchError::Configuration(format!("invalid EPSG code in {:?}", s))
            })?;
            return Self::from_epsg(code);
        }

        let rest = lower.strip_prefix("utm").unwrap_or(&lower);
        match parse_zone_suffix(rest) {
            Some((zone, tail)) if tail.trim().is_empty() => Ok(zone),
            _ => Err(MatchError::Configuration(format!(
                "cannot parse UTM zone from {:?}",
                s
            ))),
        }
    }
}

/// Parse `[_ ]zone[_ ]17[_ ]n...` from lowercase text following "utm"
fn parse_zone_suffix(rest: &str) -> Option<(UtmZone, &str)> {
    let separators = |c: char| c == '_' || c == ' ';

    let rest = rest.trim_start_matches(separators);
    let rest = rest.strip_prefix("zone").unwrap_or(rest);
    let rest = rest.trim_start_matches(separators);

    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 2 {
        return None;
    }
    let number: u8 = rest[..digits].parse().ok()?;
    let rest = rest[digits..].trim_start_matches(separators);

    let (hemisphere, tail) = if let Some(tail) = rest.strip_prefix("north") {
        (Hemisphere::North, tail)
    } else if let Some(tail) = rest.strip_prefix("south") {
        (Hemisphere::South, tail)
    } else if let Some(tail) = rest.strip_prefix('n') {
        (Hemisphere::North, tail)
    } else if let Some(tail) = rest.strip_prefix('s') {
        (Hemisphere::South, tail)
    } else {
        return None;
    };

    if tail.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    UtmZone::new(number, hemisphere).ok().map(|zone| (zone, tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESRI_PRJ: &str = r#"PROJCS["WGS_1984_UTM_Zone_17N",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",-81.0],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#;

    #[test]
    fn test_parse_shorthand() {
        let zone: UtmZone = "17N".parse().unwrap();
        assert_eq!(zone.number(), 17);
        assert_eq!(zone.hemisphere(), Hemisphere::North);

        assert_eq!("17 s".parse::<UtmZone>().unwrap().hemisphere(), Hemisphere::South);
        assert_eq!("UTM56S".parse::<UtmZone>().unwrap().number(), 56);
        assert_eq!(
            "utm zone 10 north".parse::<UtmZone>().unwrap(),
            UtmZone::new(10, Hemisphere::North).unwrap()
        );
        assert_eq!(
            "EPSG:32756".parse::<UtmZone>().unwrap(),
            UtmZone::new(56, Hemisphere::South).unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "N", "17", "61N", "0N", "17X", "17Nx", "123N", "EPSG:4326"] {
            assert!(
                matches!(bad.parse::<UtmZone>(), Err(MatchError::Configuration(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_from_esri_wkt() {
        let zone = UtmZone::from_wkt(ESRI_PRJ).unwrap();
        assert_eq!(zone, UtmZone::new(17, Hemisphere::North).unwrap());
        assert_eq!(zone.central_meridian(), -81.0);
    }

    #[test]
    fn test_from_ogc_wkt_with_authority_only() {
        let wkt = r#"PROJCS["Custom TM",GEOGCS["WGS 84"],AUTHORITY["EPSG","32733"]]"#;
        assert_eq!(
            UtmZone::from_wkt(wkt).unwrap(),
            UtmZone::new(33, Hemisphere::South).unwrap()
        );

        let named = r#"PROJCS["NAD83 / UTM zone 18N",AUTHORITY["EPSG","26918"]]"#;
        assert_eq!(UtmZone::from_wkt(named).unwrap().to_string(), "18N");
    }

    #[test]
    fn test_from_wkt_without_zone() {
        let wkt = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984"],AUTHORITY["EPSG","4326"]]"#;
        assert!(matches!(
            UtmZone::from_wkt(wkt),
            Err(MatchError::Configuration(_))
        ));
    }

    #[test]
    fn test_containing_zone() {
        let toronto = GeoPoint::new(-79.38, 43.65);
        assert_eq!(UtmZone::containing(toronto).unwrap().to_string(), "17N");

        let sydney = GeoPoint::new(151.21, -33.87);
        assert_eq!(UtmZone::containing(sydney).unwrap().to_string(), "56S");

        assert_eq!(UtmZone::containing(GeoPoint::new(180.0, 0.0)).unwrap().number(), 60);
    }
}
