//! Vehicle status payload.
//!
//! Wire keys are renamed to domain names on the way in (`row1Left` becomes
//! `front_left`, `trunk` becomes `boot`, and so on), and readings that carry
//! a no-data sentinel are dropped while the field is decoded, so a sentinel
//! is indistinguishable from a field that was never sent.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::json::{self, DecodeError};
use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulbStatus {
    Unknown,
    Failure,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorOpenStatus {
    Unknown,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DoorLockStatus {
    Unknown,
    Locked,
    LockedSafe,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowStatus {
    Unknown,
    Open,
    Closed,
    Intermediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningLevelStatus {
    Unknown,
    Normal,
    Low,
    VeryLow,
    High,
    VeryHigh,
    Restricted,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TheftAlarmStatus {
    NoAlarmInfo,
    AlarmOff,
    AlarmArmed,
    AlarmTrig,
    AlarmTrigMms,
    AlarmTrigIs,
    SensorFault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParkingBrakeStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyMode {
    Unknown,
    None,
    FullPrivacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineOnStatus {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TyrePressureWarning {
    #[default]
    Unknown,
    Normal,
    LowSoftWarn,
    LowHardWarn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Unknown,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LowBatteryAlert {
    False,
    True,
    Unknown,
    Exists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SleepMode {
    Unknown,
    Nominal,
    Standby,
    Sleep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceWarningStatus {
    Unknown,
    Normal,
    AlmostTimeForService,
    TimeForService,
    TimeExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceWarningTrigger {
    Unknown,
    CalendarTime,
    Distance,
    EngineHours,
    OilChange,
}

/// `{"value": ...}` leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading<T> {
    pub value: T,
}

impl<T> Reading<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// `{"meter": ...}` leaf.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Meters {
    pub meter: f64,
}

/// A decoded status report for one vehicle.
///
/// `local_timestamp` records when this value was decoded on this machine. It
/// is never serialized and does not take part in equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPayload {
    pub operation_id: String,
    pub vehicle_id: String,
    pub active_mode: bool,
    pub alerts: Option<Alerts>,
    pub status: VehicleStatus,
    #[serde(with = "timestamp::iso8601")]
    pub last_updated: Timestamp,
    pub sleep_mode: Option<SleepMode>,
    #[serde(skip, default = "Timestamp::now")]
    pub local_timestamp: Timestamp,
}

impl PartialEq for StatusPayload {
    fn eq(&self, other: &Self) -> bool {
        self.operation_id == other.operation_id
            && self.vehicle_id == other.vehicle_id
            && self.active_mode == other.active_mode
            && self.alerts == other.alerts
            && self.status == other.status
            && self.last_updated == other.last_updated
            && self.sleep_mode == other.sleep_mode
    }
}

impl StatusPayload {
    pub fn new(
        operation_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        active_mode: bool,
        status: VehicleStatus,
        last_updated: Timestamp,
    ) -> Self {
        Self {
            operation_id: operation_id.into(),
            vehicle_id: vehicle_id.into(),
            active_mode,
            alerts: None,
            status,
            last_updated,
            sleep_mode: None,
            local_timestamp: Timestamp::now(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        json::from_json_text(text)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alerts {
    pub alert_event: Option<AlertEvent>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub low_battery: Option<Reading<LowBatteryAlert>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatus {
    pub doors: Option<Doors>,
    pub tires: Option<Tyres>,
    pub windows: Option<Windows>,
    pub exterior_lights: Option<ExteriorLights>,
    pub service_info: Option<ServiceInfo>,
    pub is_parking_brake_engaged: Option<Reading<ParkingBrakeStatus>>,
    pub liquid_vehicle: Option<LiquidVehicle>,
    pub theft_alarm: Option<Reading<TheftAlarmStatus>>,
    pub warnings: Option<Warnings>,
    pub odometer: Option<Odometer>,
    pub trip_meters: Option<TripMeters>,
    pub drive_mode: Option<Reading<String>>,
    pub vehicle_mode: Option<VehicleMode>,
    pub is_engine_on: Option<Reading<EngineOnStatus>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Doors {
    #[serde(rename = "row1Left")]
    pub front_left: Option<Door>,
    #[serde(rename = "row1Right")]
    pub front_right: Option<Door>,
    #[serde(rename = "row2Left")]
    pub rear_left: Option<Door>,
    #[serde(rename = "row2Right")]
    pub rear_right: Option<Door>,
    #[serde(rename = "trunk")]
    pub boot: Option<Door>,
    #[serde(rename = "hood")]
    pub bonnet: Option<Door>,
    #[serde(rename = "fuelDoor")]
    pub fuel_cap: Option<Door>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    #[serde(rename = "status")]
    pub open_status: Reading<DoorOpenStatus>,
    #[serde(rename = "lockStatus")]
    pub lock_status: Reading<DoorLockStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tyres {
    pub front_left: Option<TyrePressure>,
    pub front_right: Option<TyrePressure>,
    pub rear_left: Option<TyrePressure>,
    pub rear_right: Option<TyrePressure>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TyrePressure {
    pub pressure_warning: Option<PressureWarning>,
    #[serde(default, deserialize_with = "sentinel::tyre_pressure")]
    pub pressure: Option<Pressure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PressureWarning {
    #[serde(default, deserialize_with = "pressure_warning_or_unknown")]
    pub value: TyrePressureWarning,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pressure {
    pub pascal: Option<f64>,
}

/// Missing, null and unrecognised warning values all decode to
/// [`TyrePressureWarning::Unknown`]; this field never fails a decode.
fn pressure_warning_or_unknown<'de, D>(deserializer: D) -> Result<TyrePressureWarning, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(TyrePressureWarning::Unknown);
    };

    Ok(TyrePressureWarning::deserialize(raw).unwrap_or_else(|e| {
        debug!(error = %e, "unrecognised tyre pressure warning, using UNKNOWN");
        TyrePressureWarning::Unknown
    }))
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Windows {
    #[serde(rename = "row1Left")]
    pub front_left: Option<Window>,
    #[serde(rename = "row1Right")]
    pub front_right: Option<Window>,
    #[serde(rename = "row2Left")]
    pub rear_left: Option<Window>,
    #[serde(rename = "row2Right")]
    pub rear_right: Option<Window>,
    #[serde(rename = "sunRoof")]
    pub sun_roof: Option<Window>,
    #[serde(rename = "cab")]
    pub convertible_roof: Option<Window>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(rename = "status")]
    pub open_status: Reading<WindowStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExteriorLights {
    pub parking_light_front_left: Option<Bulb>,
    pub parking_light_front_right: Option<Bulb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bulb {
    pub status: Reading<BulbStatus>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub days_to_service: Option<Reading<f64>>,
    pub distance_to_service: Option<Meters>,
    pub service_warning_status: Option<Reading<ServiceWarningStatus>>,
    pub service_warning_trigger: Option<Reading<ServiceWarningTrigger>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidVehicle {
    #[serde(default, deserialize_with = "sentinel::fuel_level")]
    pub fuel_level_percentage: Option<Reading<f64>>,
    #[serde(default, deserialize_with = "sentinel::distance_to_empty")]
    pub distance_to_empty: Option<Meters>,
    pub fuel_amount: Option<FuelAmount>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FuelAmount {
    pub liter: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warnings {
    pub brake_fluid_level: Option<Reading<WarningLevelStatus>>,
    pub engine_coolant_level: Option<Reading<WarningLevelStatus>>,
    pub washer_fluid: Option<Reading<WarningLevelStatus>>,
    pub oil_level: Option<Reading<WarningLevelStatus>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Odometer {
    #[serde(default, deserialize_with = "sentinel::odometer_distance")]
    pub distance: Option<Meters>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMeters {
    pub trip_meter_values: Option<TripMeterValues>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMeterValues {
    pub trip_meter1: Option<TripMeter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripMeter {
    pub odometer_value: Odometer,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleMode {
    pub privacy_mode: Option<Reading<Option<PrivacyMode>>>,
    pub transport_mode: Option<Reading<Option<TransportMode>>>,
}

/// No-data codes reported by the vehicle's sensors.
pub mod sentinel {
    use serde::{Deserialize, Deserializer};
    use tracing::trace;

    use super::{Meters, Pressure, Reading};

    pub const TYRE_PRESSURE_NO_DATA: [f64; 2] = [254.0, 255.0];
    pub const FUEL_LEVEL_NO_DATA: f64 = 127.0;
    pub const DISTANCE_TO_EMPTY_NO_DATA: f64 = 2047.0;
    pub const ODOMETER_NO_DATA: [f64; 2] = [16_777_214.0, 16_777_215.0];

    fn unless_no_data<'de, D, T>(
        deserializer: D,
        field: &'static str,
        is_no_data: impl Fn(&T) -> bool,
    ) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        let reading = Option::<T>::deserialize(deserializer)?;
        Ok(reading.filter(|r| {
            let no_data = is_no_data(r);
            if no_data {
                trace!(field, "dropping no-data sentinel");
            }
            !no_data
        }))
    }

    pub(super) fn tyre_pressure<'de, D>(deserializer: D) -> Result<Option<Pressure>, D::Error>
    where
        D: Deserializer<'de>,
    {
        unless_no_data(deserializer, "tyre pressure", |p: &Pressure| {
            p.pascal.is_some_and(|v| TYRE_PRESSURE_NO_DATA.contains(&v))
        })
    }

    pub(super) fn fuel_level<'de, D>(deserializer: D) -> Result<Option<Reading<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        unless_no_data(deserializer, "fuel level", |r: &Reading<f64>| {
            r.value == FUEL_LEVEL_NO_DATA
        })
    }

    pub(super) fn distance_to_empty<'de, D>(deserializer: D) -> Result<Option<Meters>, D::Error>
    where
        D: Deserializer<'de>,
    {
        unless_no_data(deserializer, "distance to empty", |d: &Meters| {
            d.meter == DISTANCE_TO_EMPTY_NO_DATA
        })
    }

    pub(super) fn odometer_distance<'de, D>(deserializer: D) -> Result<Option<Meters>, D::Error>
    where
        D: Deserializer<'de>,
    {
        unless_no_data(deserializer, "odometer", |d: &Meters| {
            ODOMETER_NO_DATA.contains(&d.meter)
        })
    }
}

impl VehicleStatus {
    /// True when every section is absent.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
