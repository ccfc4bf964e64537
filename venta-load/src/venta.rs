//! The sale payload, and how to roll a random one.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// the categories the API knows about
pub const CATEGORIAS: [&str; 4] = ["ELECTRONICA", "ROPA", "HOGAR", "BELLEZA"];

/// One sale event, goes out as the json body of POST /venta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venta {
    pub categoria: String,
    pub producto: String,
    pub precio: f64,
    pub cantidad_vendida: u32,
}

/// Build a fresh payload from the given random stream.
///
/// Every field is drawn independently, nothing is remembered between calls:
/// categoria uniform over CATEGORIAS, producto is "PRD-" plus 6 uppercase
/// letters, precio uniform in [1, 200] kept to two decimals (half away from
/// zero), cantidad_vendida uniform in 1..=10.
pub fn random_venta<R: Rng + ?Sized>(rng: &mut R) -> Venta {
    let categoria = CATEGORIAS[rng.gen_range(0..CATEGORIAS.len())].to_string();
    let suffix: String = (0..6)
        .map(|_| rng.gen_range(b'A'..=b'Z') as char)
        .collect();
    let precio = (rng.gen_range(1.0..=200.0_f64) * 100.0).round() / 100.0;
    Venta {
        categoria,
        producto: format!("PRD-{suffix}"),
        precio,
        cantidad_vendida: rng.gen_range(1..=10),
    }
}
