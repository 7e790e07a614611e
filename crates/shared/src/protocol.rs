//! Device HTTP surface: every path is a plain GET against the device base url.

use crate::domain::TargetTemp;

pub const SET_TEMP_ROUTE: &str = "/set-temp";
pub const SET_TEMP_QUERY_KEY: &str = "value";
pub const AUTO_ROUTE: &str = "/auto";
pub const OPEN_ROUTE: &str = "/open";
pub const CLOSE_ROUTE: &str = "/close";
pub const STOP_ROUTE: &str = "/stop";
pub const GET_TEMP_ROUTE: &str = "/get-temp";
pub const GET_ROOM_TEMP_ROUTE: &str = "/get-room-temp";
pub const GET_MODE_ROUTE: &str = "/get-mode";

pub fn set_temp_path(temp: TargetTemp) -> String {
    format!("{SET_TEMP_ROUTE}?{SET_TEMP_QUERY_KEY}={}", temp.value())
}
