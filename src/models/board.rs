use serde::{Deserialize, Serialize};

/// A snowboard in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Document identifier, generated on create when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Model year
    #[serde(default)]
    pub year: i32,

    #[serde(default)]
    pub name: String,

    /// Manufacturer code
    #[serde(default)]
    pub code: String,

    /// Length in cm, with a `W` suffix for wide boards (e.g. `158W`)
    #[serde(default)]
    pub size: String,

    #[serde(default)]
    pub spec: Spec,

    #[serde(default)]
    pub features: Vec<Feature>,

    #[serde(default)]
    pub terrain: String,

    #[serde(default)]
    pub riding_level: String,

    #[serde(default)]
    pub bend: String,

    #[serde(default)]
    pub shape: String,

    /// Free-text description
    #[serde(default)]
    pub details: String,
}

impl Board {
    /// The board's document body, without its identifier
    pub fn source(&self) -> serde_json::Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("id");
        }
        Ok(value)
    }

    /// Rebuild a board from a stored document body and its identifier
    pub fn from_source(id: impl Into<String>, source: serde_json::Value) -> serde_json::Result<Self> {
        let mut board: Board = serde_json::from_value(source)?;
        board.id = Some(id.into());
        Ok(board)
    }
}

/// Technical measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default)]
    pub contact_length: i32,

    #[serde(default)]
    pub side_cut: f64,

    #[serde(default)]
    pub nose_width: f64,

    #[serde(default)]
    pub tail_width: f64,

    #[serde(default)]
    pub waist_width: f64,

    #[serde(default)]
    pub stance: Stance,

    /// 1 (soft) to 10 (stiff)
    #[serde(default)]
    pub flex: i32,

    #[serde(default)]
    pub weight_range: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stance {
    #[serde(default)]
    pub min: f64,

    #[serde(default)]
    pub max: f64,

    #[serde(default)]
    pub set_back: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub feature_type: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_board() -> Board {
        Board {
            id: Some("b-1".to_string()),
            year: 2018,
            name: "Orca".to_string(),
            code: "490154203237518".to_string(),
            size: "158W".to_string(),
            spec: Spec {
                contact_length: 118,
                side_cut: 8.1,
                nose_width: 30.7,
                tail_width: 29.1,
                waist_width: 26.0,
                stance: Stance {
                    min: 19.5,
                    max: 24.0,
                    set_back: 0.5,
                },
                flex: 6,
                weight_range: 80,
            },
            features: vec![Feature {
                feature_type: "Core".to_string(),
                name: "Poplar".to_string(),
                description: "Light and poppy".to_string(),
            }],
            terrain: "Freeride".to_string(),
            riding_level: "Advanced".to_string(),
            bend: "Camber".to_string(),
            shape: "Directional".to_string(),
            details: "Deep snow".to_string(),
        }
    }

    #[test]
    fn test_camel_case_wire_format() {
        let value = serde_json::to_value(sample_board()).unwrap();
        assert_eq!(value["ridingLevel"], "Advanced");
        assert_eq!(value["spec"]["contactLength"], 118);
        assert_eq!(value["spec"]["stance"]["setBack"], 0.5);
        assert_eq!(value["features"][0]["type"], "Core");
    }

    #[test]
    fn test_source_strips_id() {
        let source = sample_board().source().unwrap();
        assert!(source.get("id").is_none());
        assert_eq!(source["name"], "Orca");
    }

    #[test]
    fn test_from_source_sets_id() {
        let board = Board::from_source("abc", json!({"year": 2015, "size": "154"})).unwrap();
        assert_eq!(board.id.as_deref(), Some("abc"));
        assert_eq!(board.year, 2015);
        assert_eq!(board.size, "154");
        assert!(board.features.is_empty());
    }

    #[test]
    fn test_missing_id_is_omitted() {
        let mut board = sample_board();
        board.id = None;
        let value = serde_json::to_value(&board).unwrap();
        assert!(value.get("id").is_none());
    }
}
