// Windowed aggregation of a time series: walk the samples forward, cut them into
// fixed ISO-8601 windows and compute avg/min/max per non-empty window.
// Windowed values are normalised to one decimal on entry; averages are rounded to two.

use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::models::{AggregateWindow, TimeSeriesSample, round_to};

const VALUE_DECIMALS: i32 = 1;
const AVERAGE_DECIMALS: i32 = 2;

/// Caller mistakes; never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("unsupported aggregation period duration: {0:?}")]
    UnsupportedDuration(String),
    #[error("unsupported aggregation method: {0:?}")]
    UnsupportedMethod(String),
}

/// Supported window sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowDuration {
    FifteenMinutes,
    OneHour,
    OneDay,
    OneWeek,
}

impl WindowDuration {
    pub fn as_delta(self) -> TimeDelta {
        match self {
            WindowDuration::FifteenMinutes => TimeDelta::minutes(15),
            WindowDuration::OneHour => TimeDelta::hours(1),
            WindowDuration::OneDay => TimeDelta::hours(24),
            WindowDuration::OneWeek => TimeDelta::days(7),
        }
    }
}

impl FromStr for WindowDuration {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "PT15M" => Ok(WindowDuration::FifteenMinutes),
            "PT1H" | "PT60M" => Ok(WindowDuration::OneHour),
            "PT24H" | "P1D" => Ok(WindowDuration::OneDay),
            "P7D" | "P1W" => Ok(WindowDuration::OneWeek),
            other => Err(AggregationError::UnsupportedDuration(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Average,
    Min,
    Max,
}

impl FromStr for AggregateFn {
    type Err = AggregationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "avg" | "average" => Ok(AggregateFn::Average),
            "min" => Ok(AggregateFn::Min),
            "max" => Ok(AggregateFn::Max),
            other => Err(AggregationError::UnsupportedMethod(other.to_owned())),
        }
    }
}

/// Parses a comma separated method list (`"avg,max"`). Blank entries are ignored,
/// duplicates collapse.
pub fn parse_methods(s: &str) -> Result<Vec<AggregateFn>, AggregationError> {
    let mut out = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let f = part.parse::<AggregateFn>()?;
        if !out.contains(&f) {
            out.push(f);
        }
    }
    Ok(out)
}

/// A validated aggregation request. No functions means pass-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationRequest {
    pub window: WindowDuration,
    pub functions: Vec<AggregateFn>,
    pub from: Option<DateTime<Utc>>,
}

impl AggregationRequest {
    /// `window` defaults to one hour when absent; it is validated even in pass-through mode.
    pub fn parse(
        window: Option<&str>,
        methods: Option<&str>,
        from: Option<DateTime<Utc>>,
    ) -> Result<Self, AggregationError> {
        let window = match window {
            Some(w) => w.parse()?,
            None => WindowDuration::OneHour,
        };
        let functions = match methods {
            Some(m) => parse_methods(m)?,
            None => Vec::new(),
        };
        Ok(Self {
            window,
            functions,
            from,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Aggregation {
    Windows(Vec<AggregateWindow>),
    Samples(Vec<TimeSeriesSample>),
}

impl Aggregation {
    pub fn len(&self) -> usize {
        match self {
            Aggregation::Windows(w) => w.len(),
            Aggregation::Samples(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs `request` over `samples` (ascending by timestamp). Without functions the
/// samples come back unchanged.
pub fn aggregate(samples: &[TimeSeriesSample], request: &AggregationRequest) -> Aggregation {
    if request.functions.is_empty() {
        return Aggregation::Samples(samples.to_vec());
    }
    Aggregation::Windows(aggregate_windows(
        samples,
        request.window,
        &request.functions,
        request.from,
    ))
}

/// Buckets are `[start, start + window)`, starting at `from` or the first sample.
/// Samples before `from` are ignored. Windows without samples are not emitted.
pub fn aggregate_windows(
    samples: &[TimeSeriesSample],
    window: WindowDuration,
    functions: &[AggregateFn],
    from: Option<DateTime<Utc>>,
) -> Vec<AggregateWindow> {
    let Some(first) = samples.first() else {
        return Vec::new();
    };
    let step = window.as_delta();
    let step_ms = step.num_milliseconds();
    let mut start = from.unwrap_or(first.timestamp);
    let mut bucket: Vec<f64> = Vec::new();
    let mut out = Vec::new();

    for sample in samples {
        if sample.timestamp < start {
            continue;
        }
        if sample.timestamp >= start + step {
            if let Some(w) = close_window(start, step, &bucket, functions) {
                out.push(w);
            }
            bucket.clear();
            let skipped = (sample.timestamp - start).num_milliseconds() / step_ms;
            start += TimeDelta::milliseconds(skipped * step_ms);
        }
        bucket.push(round_to(sample.value, VALUE_DECIMALS));
    }
    if let Some(w) = close_window(start, step, &bucket, functions) {
        out.push(w);
    }
    out
}

fn close_window(
    start: DateTime<Utc>,
    step: TimeDelta,
    values: &[f64],
    functions: &[AggregateFn],
) -> Option<AggregateWindow> {
    if values.is_empty() {
        return None;
    }
    let mut w = AggregateWindow {
        from: start,
        to: start + step,
        average: None,
        min: None,
        max: None,
    };
    for f in functions {
        match f {
            AggregateFn::Average => {
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                w.average = Some(round_to(mean, AVERAGE_DECIMALS));
            }
            AggregateFn::Min => {
                w.min = Some(values.iter().copied().fold(f64::INFINITY, f64::min));
            }
            AggregateFn::Max => {
                w.max = Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max));
            }
        }
    }
    Some(w)
}
