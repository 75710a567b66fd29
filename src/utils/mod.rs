pub mod coerce;
pub mod db_utils;
