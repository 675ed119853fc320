//! Station dataset to fuel plan, through the public library surface.

use fuelstop_core::spatial::offset_by_bearing_miles;
use fuelstop_core::{plan_fuel_stops, Coverage, PlannerConfig, RoutePoint, RouteTrace};
use fuelstop_server::stations::{load_catalog, PlaceIndex};
use std::io::Write;

fn write_dataset(rows: &[String]) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("fuelstop-test-{}.csv", uuid::Uuid::new_v4()));
    let mut file = std::fs::File::create(&path).expect("create csv");
    writeln!(file, "OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price,latitude,longitude").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    path
}

#[test]
fn csv_dataset_plans_stops_along_route() {
    let start = (36.0, -98.0);
    let trace: RouteTrace = (0..900)
        .map(|k| {
            let (lat, lon) = offset_by_bearing_miles(start.0, start.1, k as f64 * 1.001, 0.0);
            RoutePoint::new(lat, lon)
        })
        .collect();
    let at_410 = trace.get(410).copied().unwrap();
    let at_820 = trace.get(820).copied().unwrap();
    let (near_lat, near_lon) = offset_by_bearing_miles(at_410.lat, at_410.lon, 2.0, 1.5);

    let path = write_dataset(&[
        format!("1,ALPHA,I-35 EXIT 1,Alpha,KS,1,3.40,{},{}", near_lat, near_lon),
        // Same station listed twice; the cheaper price is kept.
        format!("1,ALPHA,I-35 EXIT 1,Alpha,KS,1,3.05,{},{}", near_lat, near_lon),
        format!("2,BRAVO,US-81,Bravo,NE,1,2.99,{},{}", at_820.lat, at_820.lon + 0.5),
        "3,CHARLIE,SR-9,Charlie,NE,1,2.50,,".to_string(),
    ]);

    let config = PlannerConfig::default();
    let catalog = load_catalog(&path, config.grid()).expect("load catalog");
    std::fs::remove_file(&path).ok();

    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.stats().duplicates_merged, 1);
    assert_eq!(catalog.stats().missing_coordinates, 1);

    let places = PlaceIndex::from_catalog(&catalog);
    assert!(places.lookup("alpha, ks").is_some());

    let plan = plan_fuel_stops(&trace, &catalog, &config);
    let indices: Vec<usize> = plan.refuel_points.iter().map(|p| p.trace_index).collect();
    assert_eq!(indices, vec![410, 820]);
    assert_eq!(plan.coverage, Coverage::Complete);

    // BRAVO sits half a degree of longitude (over 20 mi) off the route.
    assert_eq!(plan.stops.len(), 1);
    assert_eq!(plan.unserved_points(), 1);
    assert_eq!(plan.stops[0].station_name, "ALPHA");
    assert_eq!(plan.stops[0].price_per_gallon, 3.05);
    assert!((plan.total_cost - 152.5).abs() < 1e-9);
}
