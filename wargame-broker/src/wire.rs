//! JSON shapes exchanged with the game broker
//!
//! A posted move is `{"from":{"row":3,"col":4},"to":{"row":2,"col":4},"turn":1}`;
//! every reply is wrapped as `{"success":true,"data":<move or null>}`.

use serde::{Deserialize, Serialize};
use wargame_core::{Coord, CoordPair};

/// One move as stored by the broker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerMove {
    pub from: Coord,
    pub to: Coord,
    /// Turn count once this move has been played
    pub turn: u32,
}

impl BrokerMove {
    pub fn new(pair: CoordPair, turn: u32) -> Self {
        Self {
            from: pair.src,
            to: pair.dst,
            turn,
        }
    }

    pub fn pair(&self) -> CoordPair {
        CoordPair::new(self.from, self.to)
    }
}

/// Reply wrapper used for every broker response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<BrokerMove>,
}

impl BrokerEnvelope {
    pub fn ok(data: Option<BrokerMove>) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_json_shape() {
        let mv = BrokerMove::new(CoordPair::from_quad(3, 4, 2, 4), 1);
        let value = serde_json::to_value(mv).unwrap();
        assert_eq!(
            value,
            json!({"from": {"row": 3, "col": 4}, "to": {"row": 2, "col": 4}, "turn": 1})
        );
        assert_eq!(mv.pair().to_string(), "D4 C4");
    }

    #[test]
    fn test_envelope_null_data() {
        let envelope: BrokerEnvelope =
            serde_json::from_str(r#"{"success": true, "data": null}"#).unwrap();
        assert_eq!(envelope, BrokerEnvelope::ok(None));

        // Some brokers leave the field out entirely
        let envelope: BrokerEnvelope = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!envelope.success);
        assert!(envelope.data.is_none());
    }
}
