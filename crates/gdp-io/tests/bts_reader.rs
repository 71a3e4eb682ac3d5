//! Reading scheduled arrivals into planning demand

use chrono::{Duration, TimeZone, Utc};
use gdp_core::{DemandAggregator, FlightStatus, Horizon};
use gdp_io::{AirportDirectory, BtsReader, IoError};
use std::io::Write;
use tempfile::NamedTempFile;

const ZONES: &str = "\
ORD America/Chicago
ATL America/New_York
EWR America/New_York
DEN America/Denver
";

// Arrival times in UTC (July, so CDT = UTC-5, EDT = UTC-4, MDT = UTC-6):
// 1: ORD 0700 + 120 -> 14:00  in window, sitting
// 2: ATL 0930 + 60  -> 14:30  in window, sitting
// 3: DEN 0500 + 150 -> 13:30  in window, airborne (departed 11:00)
// 4: ORD 0700 + 120 bound for ATL, ignored
// 5: ATL 1200 + 60  -> 17:00  after window
const BTS: &str = "\
Year,Month,DayofMonth,Carrier,Origin,Dest,CRSDepTime,CRSArrTime,CRSElapsedTime
2017,7,15,UA,ORD,EWR,0700,1000,120.00
2017,7,15,DL,ATL,ewr,930,1030,60.00
2017,7,15,UA,DEN,EWR,0500,1030,150.00
2017,7,15,AA,ORD,ATL,0700,0900,120.00
2017,7,15,DL,ATL,EWR,1200,1300,60.00
";

fn directory() -> AirportDirectory {
    let mut directory = AirportDirectory::new();
    directory.read_timezones(ZONES.as_bytes()).unwrap();
    directory
}

fn window() -> Horizon {
    Horizon::new(
        Utc.with_ymd_and_hms(2017, 7, 15, 12, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2017, 7, 15, 15, 0, 0).unwrap(),
        Duration::minutes(15),
    )
    .unwrap()
}

#[test]
fn reads_arrivals_inside_window() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(BTS.as_bytes()).unwrap();

    let directory = directory();
    let flights = BtsReader::new(&directory)
        .read_arrivals_path(file.path(), "EWR", &window())
        .unwrap();

    assert_eq!(flights.len(), 3);
    let ids: Vec<u32> = flights.iter().map(|f| f.id.value()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(
        flights[0].arrival,
        Utc.with_ymd_and_hms(2017, 7, 15, 14, 0, 0).unwrap()
    );
    assert_eq!(flights[1].origin, "ATL");
    assert_eq!(flights[2].status(&window()), FlightStatus::Airborne);
}

#[test]
fn arrivals_feed_demand_aggregation() {
    let directory = directory();
    let flights = BtsReader::new(&directory)
        .read_arrivals(BTS.as_bytes(), "EWR", &window())
        .unwrap();

    let demand = DemandAggregator::new(window()).aggregate(&flights).unwrap();
    assert_eq!(demand.num_periods(), 12);
    // ORD departs 12:00 (period 0), 8 periods; ATL departs 13:30 (period 6), 4 periods.
    assert_eq!(demand.demand(8, 0), 1);
    assert_eq!(demand.demand(4, 6), 1);
    // DEN lands 13:30, period 6.
    assert_eq!(demand.enroute(6), 1);
    assert_eq!(demand.total_sitting(), 2);
}

#[test]
fn unknown_origin_is_an_error() {
    let directory = AirportDirectory::new()
        .with_timezone("ORD", chrono_tz::America::Chicago);
    let err = BtsReader::new(&directory)
        .read_arrivals(BTS.as_bytes(), "EWR", &window())
        .unwrap_err();
    assert!(matches!(err, IoError::UnknownAirport(code) if code == "ATL"));
}

#[test]
fn malformed_time_names_the_row() {
    let data = "Year,Month,DayofMonth,Origin,Dest,CRSDepTime,CRSElapsedTime\n2017,7,15,ORD,EWR,7h00,120\n";
    let err = BtsReader::new(&directory())
        .read_arrivals(data.as_bytes(), "EWR", &window())
        .unwrap_err();
    assert!(matches!(err, IoError::Parse(ref msg) if msg.contains("row 2")));
}

#[test]
fn rows_for_other_airports_are_not_decoded() {
    // Row 2 is bound elsewhere and has neither elapsed time nor a valid
    // clock; row 4 is ours but was never scheduled.
    let data = "\
Year,Month,DayofMonth,Origin,Dest,CRSDepTime,CRSElapsedTime
2017,7,15,ORD,ATL,,
2017,7,15,ORD,EWR,0700,119.6
2017,7,15,ATL,EWR,0930,
";
    let flights = BtsReader::new(&directory())
        .read_arrivals(data.as_bytes(), "EWR", &window())
        .unwrap();

    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0].origin, "ORD");
    assert_eq!(flights[0].duration(), Duration::minutes(120));
    assert_eq!(
        flights[0].arrival,
        Utc.with_ymd_and_hms(2017, 7, 15, 14, 0, 0).unwrap()
    );
}

#[test]
fn non_finite_elapsed_time_names_the_row() {
    let data = "Year,Month,DayofMonth,Origin,Dest,CRSDepTime,CRSElapsedTime\n2017,7,15,ORD,EWR,0700,NaN\n";
    let err = BtsReader::new(&directory())
        .read_arrivals(data.as_bytes(), "EWR", &window())
        .unwrap_err();
    assert!(matches!(err, IoError::Parse(ref msg) if msg.contains("row 2")));
}
