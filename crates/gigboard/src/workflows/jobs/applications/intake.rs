use super::domain::Bid;

/// Validation errors raised before a bid reaches the admission controller.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum BidViolation {
    #[error("proposed price must be a positive amount (found {found})")]
    NonPositivePrice { found: f64 },
    #[error("delivery must take at least one day")]
    ZeroDeliveryDays,
    #[error("pitch must not be empty")]
    EmptyPitch,
    #[error("{field} exceeds {max} characters (found {found})")]
    TooLong {
        field: &'static str,
        max: usize,
        found: usize,
    },
    #[error("portfolio sample must be an http(s) URL")]
    InvalidPortfolioUrl,
}

const DEFAULT_MAX_PITCH_CHARS: usize = 2_000;
const DEFAULT_MAX_QUESTION_CHARS: usize = 500;

/// Length limits applied to free-text bid fields.
#[derive(Debug, Clone, Copy)]
pub struct BidPolicy {
    pub max_pitch_chars: usize,
    pub max_question_chars: usize,
}

impl Default for BidPolicy {
    fn default() -> Self {
        Self {
            max_pitch_chars: DEFAULT_MAX_PITCH_CHARS,
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
        }
    }
}

/// Caller-side bid check used by the HTTP intake route.
#[derive(Debug, Clone, Default)]
pub struct BidGuard {
    policy: BidPolicy,
}

impl BidGuard {
    pub fn with_policy(policy: BidPolicy) -> Self {
        Self { policy }
    }

    /// Return a trimmed copy of `bid`, or the first rule it breaks.
    pub fn sanitize(&self, bid: Bid) -> Result<Bid, BidViolation> {
        if !bid.proposed_price.is_finite() || bid.proposed_price <= 0.0 {
            return Err(BidViolation::NonPositivePrice {
                found: bid.proposed_price,
            });
        }

        if bid.delivery_days == 0 {
            return Err(BidViolation::ZeroDeliveryDays);
        }

        let pitch = bid.pitch.trim().to_string();
        if pitch.is_empty() {
            return Err(BidViolation::EmptyPitch);
        }
        check_length("pitch", &pitch, self.policy.max_pitch_chars)?;

        let portfolio_sample_url = non_blank(bid.portfolio_sample_url);
        if let Some(url) = &portfolio_sample_url {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(BidViolation::InvalidPortfolioUrl);
            }
        }

        let question_for_creator = non_blank(bid.question_for_creator);
        if let Some(question) = &question_for_creator {
            check_length(
                "question_for_creator",
                question,
                self.policy.max_question_chars,
            )?;
        }

        Ok(Bid {
            proposed_price: bid.proposed_price,
            delivery_days: bid.delivery_days,
            pitch,
            portfolio_sample_url,
            question_for_creator,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), BidViolation> {
    let found = value.chars().count();
    if found > max {
        return Err(BidViolation::TooLong { field, max, found });
    }
    Ok(())
}
