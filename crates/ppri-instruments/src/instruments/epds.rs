use std::sync::LazyLock;

use crate::scoring::{Band, Item, ScoreRange};
use crate::Instrument;

/// Total at or above which the EPDS result is High Risk and the safety alert fires.
pub const HIGH_RISK_THRESHOLD: u8 = 13;

/// Total at or above which the EPDS result is at least Moderate Risk.
pub const MODERATE_RISK_THRESHOLD: u8 = 10;

/// EPDS: Edinburgh Postnatal Depression Scale.
/// 10 items, each rated 0–3 over the past seven days. Total 0–30.
pub struct Epds;

impl Instrument for Epds {
    fn id(&self) -> &str {
        "epds"
    }

    fn name(&self) -> &str {
        "EPDS"
    }

    fn items(&self) -> &[Item] {
        static ITEMS: LazyLock<Vec<Item>> = LazyLock::new(|| {
            let prompts = [
                "I have been able to laugh and see the funny side of things",
                "I have looked forward with enjoyment to things",
                "I have blamed myself unnecessarily when things went wrong",
                "I have been anxious or worried for no good reason",
                "I have felt scared or panicky for no very good reason",
                "Things have been getting on top of me",
                "I have been so unhappy that I have had difficulty sleeping",
                "I have felt sad or miserable",
                "I have been so unhappy that I have been crying",
                "The thought of harming myself has occurred to me",
            ];

            prompts
                .iter()
                .zip(1u8..)
                .map(|(prompt, number)| Item {
                    id: format!("epds_{number}"),
                    number,
                    prompt: prompt.to_string(),
                    range: ScoreRange { min: 0, max: 3 },
                })
                .collect()
        });
        &ITEMS
    }

    fn bands(&self) -> &[Band] {
        static BANDS: LazyLock<Vec<Band>> = LazyLock::new(|| {
            vec![
                Band {
                    label: "Low Risk".to_string(),
                    range: ScoreRange {
                        min: 0,
                        max: MODERATE_RISK_THRESHOLD - 1,
                    },
                },
                Band {
                    label: "Moderate Risk".to_string(),
                    range: ScoreRange {
                        min: MODERATE_RISK_THRESHOLD,
                        max: HIGH_RISK_THRESHOLD - 1,
                    },
                },
                Band {
                    label: "High Risk".to_string(),
                    range: ScoreRange {
                        min: HIGH_RISK_THRESHOLD,
                        max: 30,
                    },
                },
            ]
        });
        &BANDS
    }
}
