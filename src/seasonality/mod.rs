//! Seasonal components for additive models.

mod fourier;

pub use fourier::{
    resolve_seasonalities, FourierSeasonality, WEEKLY_DEFAULT_ORDER, WEEKLY_PERIOD_DAYS,
    YEARLY_DEFAULT_ORDER, YEARLY_PERIOD_DAYS,
};
