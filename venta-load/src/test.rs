//! End to end tests: they run the real population against a live rocket
//! server hosting a mock /venta endpoint.
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use harness::prelude::*;
use rocket::{http::Status, post, routes, serde::json::Json, State};

use crate::scenario::VentaScenario;
use crate::venta::{Venta, CATEGORIAS};

type Seen = Arc<Mutex<Vec<Venta>>>;

/// echoes the sale back with a 201, remembering what it saw
#[post("/venta", data = "<venta>")]
fn venta_echo(venta: Json<Venta>, seen: &State<Seen>) -> (Status, Json<Venta>) {
    seen.lock().unwrap().push(venta.0.clone());
    (Status::Created, venta)
}

/// a backend having a very bad day
#[post("/venta", data = "<_venta>")]
fn venta_broken(_venta: Json<Venta>) -> Status {
    Status::InternalServerError
}

fn figment(port: u16) -> rocket::figment::Figment {
    rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "127.0.0.1"))
        .merge(("log_level", "off"))
}

/// launch the given rocket in background and wait until it answers
async fn spawn_server(rocket: rocket::Rocket<rocket::Build>, port: u16) {
    tokio::spawn(async move {
        let _ = rocket.launch().await;
    });
    for _ in 0..100 {
        if reqwest::get(format!("http://127.0.0.1:{port}/"))
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("mock server did not come up on port {port}");
}

fn assert_valid(venta: &Venta) {
    assert!(CATEGORIAS.contains(&venta.categoria.as_str()));
    assert_eq!(venta.producto.len(), 10);
    assert!(venta.producto.starts_with("PRD-"));
    assert!(venta.producto[4..].chars().all(|c| c.is_ascii_uppercase()));
    assert!(venta.precio >= 1.0 && venta.precio <= 200.0);
    assert!((1..=10).contains(&venta.cantidad_vendida));
}

#[rocket::async_test]
async fn five_iterations_reach_the_endpoint() {
    let port = 18083;
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let rocket = rocket::custom(figment(port))
        .manage(seen.clone())
        .mount("/", routes![venta_echo]);
    spawn_server(rocket, port).await;

    let report = Runner::new(VentaScenario)
        .set_host(format!("http://127.0.0.1:{port}"))
        .set_users(1)
        .set_iterations(5)
        .set_think_time(0.0, 0.05)
        .execute()
        .await
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.failed, 0);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 5);
    let mut productos = HashSet::new();
    for venta in seen.iter() {
        assert_valid(venta);
        productos.insert(venta.producto.clone());
    }
    // independent draws, a repeated code out of 26^6 would be something
    assert_eq!(productos.len(), 5);
}

#[rocket::async_test]
async fn server_errors_do_not_stop_the_loop() {
    let port = 18084;
    let rocket = rocket::custom(figment(port)).mount("/", routes![venta_broken]);
    spawn_server(rocket, port).await;

    let report = Runner::new(VentaScenario)
        .set_host(format!("http://127.0.0.1:{port}"))
        .set_users(1)
        .set_iterations(4)
        .set_think_time(0.0, 0.05)
        .execute()
        .await
        .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.failed, 4);
    assert_eq!(report.failures.get("HTTP 500"), Some(&4));
}
