// Domain models served by the gateway

mod air_quality;
mod beach;
mod citywork;
mod common;
mod road_accident;
mod sports;
mod temperature;
mod trail;
mod water_quality;
mod weather;

pub use air_quality::{AirQuality, Pollutant};
pub use beach::{Beach, BeachWaterQuality};
pub use citywork::CityWork;
pub use common::{
    Geometry, Position, lenient_datetime, lenient_geometry, round_to, string_list,
};
pub(crate) use common::datetime_from_value;
pub use road_accident::RoadAccident;
pub use sports::{SportsField, SportsVenue};
pub use temperature::{AggregateWindow, TimeSeriesSample};
pub use trail::ExerciseTrail;
pub use water_quality::WaterQuality;
pub use weather::WeatherObservation;
