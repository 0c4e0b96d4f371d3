//! Validated fortune requests and their prompts.
//!
//! A [`Reading`] only exists once its mode's required fields are present, so
//! prompt construction is a pure function of the variant.

use crate::ai::mime::parse_base64_image;
use crate::models::{FortunePayload, Mode, Prompt, PromptImage, TarotDraw};
use crate::{prompts, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    BirthChart { birth: String, hour: String },
    Palm { image: Option<PromptImage> },
    Astrology { birthday: String },
    Tarot {
        question: String,
        cards: Option<[String; 3]>,
    },
}

/// Trimmed value, or `None` when absent or blank.
fn filled(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Reading {
    pub fn validate(mode: Mode, payload: &FortunePayload, tarot_draw: TarotDraw) -> Result<Self> {
        match mode {
            Mode::Bazi => {
                match (
                    filled(payload.birth.as_ref()),
                    filled(payload.hour.as_ref()),
                ) {
                    (Some(birth), Some(hour)) => Ok(Reading::BirthChart { birth, hour }),
                    _ => Err(Error::MissingBirthInfo),
                }
            }
            Mode::Palm => {
                let image = match payload.image.as_deref() {
                    Some(raw) => parse_base64_image(raw)?,
                    None => None,
                };
                Ok(Reading::Palm { image })
            }
            Mode::Astrology => filled(payload.birthday.as_ref())
                .map(|birthday| Reading::Astrology { birthday })
                .ok_or(Error::MissingBirthday),
            Mode::Tarot => {
                let question = filled(payload.question.as_ref()).ok_or(Error::MissingQuestion)?;
                let cards = match tarot_draw {
                    TarotDraw::Model => None,
                    TarotDraw::Caller => Some(Self::drawn_cards(payload.cards.as_deref())?),
                };
                Ok(Reading::Tarot { question, cards })
            }
        }
    }

    fn drawn_cards(cards: Option<&[String]>) -> Result<[String; 3]> {
        let names: Vec<String> = cards
            .unwrap_or_default()
            .iter()
            .filter_map(|card| filled(Some(card)))
            .collect();

        <[String; 3]>::try_from(names).map_err(|_| Error::MissingCards)
    }

    pub fn prompt(&self) -> Prompt {
        match self {
            Reading::BirthChart { birth, hour } => Prompt {
                text: prompts::render(prompts::BAZI, &[("birth", birth), ("hour", hour)]),
                image: None,
            },
            Reading::Palm { image: Some(image) } => Prompt {
                text: prompts::render(prompts::PALM_IMAGE, &[]),
                image: Some(image.clone()),
            },
            Reading::Palm { image: None } => Prompt {
                text: prompts::render(prompts::PALM_GENERIC, &[]),
                image: None,
            },
            Reading::Astrology { birthday } => Prompt {
                text: prompts::render(prompts::ASTROLOGY, &[("birthday", birthday)]),
                image: None,
            },
            Reading::Tarot {
                question,
                cards: None,
            } => Prompt {
                text: prompts::render(prompts::TAROT_DRAW, &[("question", question)]),
                image: None,
            },
            Reading::Tarot {
                question,
                cards: Some([past, present, future]),
            } => Prompt {
                text: prompts::render(
                    prompts::TAROT_CARDS,
                    &[
                        ("question", question),
                        ("past", past),
                        ("present", present),
                        ("future", future),
                    ],
                ),
                image: None,
            },
        }
    }
}
