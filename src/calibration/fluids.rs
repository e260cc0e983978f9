//! Density and viscosity of the reference oils used to validate the rig.
//!
//! Each fluid is described by a linear density fit `rho = a T + b` (g/cm3) and a
//! dynamic viscosity fit `mu = exp(c) exp(d / T + e T + f T^2)` (mPa s), with `T`
//! in degrees Celsius.
use crate::engine::common::error::EngineError;
use crate::utils::constants::G_CM3_TO_KG_M3;
use indexmap::IndexMap;
use std::sync::OnceLock;

type Result<T> = std::result::Result<T, EngineError>;

/// Empirical coefficients of one reference fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidModel {
    /// Density slope (g/cm3 per degree C)
    pub a: f64,
    /// Density intercept (g/cm3)
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

/// Density and kinematic viscosity at a given temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidProperties {
    /// Density (kg/m3)
    pub density: f64,
    /// Kinematic viscosity (cSt)
    pub kinematic_viscosity: f64,
}

impl FluidModel {
    /// Density in g/cm3
    fn density_g_cm3(&self, temperature: f64) -> f64 {
        self.a * temperature + self.b
    }

    /// Dynamic viscosity in mPa s
    fn dynamic_viscosity(&self, temperature: f64) -> f64 {
        self.c.exp()
            * (self.d / temperature + self.e * temperature + self.f * temperature * temperature)
                .exp()
    }

    pub fn properties(&self, temperature: f64) -> FluidProperties {
        let density = self.density_g_cm3(temperature);
        // mPa s over g/cm3 is cSt
        let kinematic_viscosity = self.dynamic_viscosity(temperature) / density;
        FluidProperties {
            density: density * G_CM3_TO_KG_M3,
            kinematic_viscosity,
        }
    }
}

const FLUIDS: [(&str, FluidModel); 8] = [
    (
        "S600",
        FluidModel {
            a: -0.000590440403569401,
            b: 0.858310527135024,
            c: 8.09628403884733,
            d: 7.40047695400422,
            e: -0.0624543915524598,
            f: 0.000175851462028443,
        },
    ),
    (
        "S60",
        FluidModel {
            a: -0.000636193475467889,
            b: 0.888793688383073,
            c: 6.09426031336495,
            d: 1.93903872633985,
            e: -0.0669305189350423,
            f: 0.000240395048492693,
        },
    ),
    (
        "N350",
        FluidModel {
            a: -0.000589193302640659,
            b: 0.885119170795794,
            c: 7.77453937809582,
            d: 8.95539541920474,
            e: -0.0688531041991786,
            f: 0.000208226882730463,
        },
    ),
    (
        "N35",
        FluidModel {
            a: -0.000625639760998825,
            b: 0.869224566278919,
            c: 4.78514868686062,
            d: 8.02834694098624,
            e: -0.0479235880493548,
            f: 0.000142520951173293,
        },
    ),
    (
        "S3S",
        FluidModel {
            a: -0.000699195896992767,
            b: 0.834173694916320,
            c: 1.51274855245423,
            d: 3.92003348585739,
            e: -0.0211267393546965,
            f: 4.44591968497190e-05,
        },
    ),
    (
        "S6S",
        FluidModel {
            a: -0.000672928619079388,
            b: 0.858228485657105,
            c: 2.33742852670512,
            d: 6.95924738065282,
            e: -0.0262433861993490,
            f: 5.92404527473303e-05,
        },
    ),
    (
        "S60S",
        FluidModel {
            a: -0.0006154176610978536,
            b: 0.8740448687350836,
            c: 5.18619877,
            d: 12.28192665,
            e: -0.04623777,
            f: 0.00011475,
        },
    ),
    (
        "S600S",
        FluidModel {
            a: -0.000581334222815211,
            b: 0.889698398932622,
            c: 8.13224726879007,
            d: 14.6503135839463,
            e: -0.0662712860081032,
            f: 0.000173827010406862,
        },
    ),
];

fn registry() -> &'static IndexMap<&'static str, FluidModel> {
    static REGISTRY: OnceLock<IndexMap<&'static str, FluidModel>> = OnceLock::new();
    REGISTRY.get_or_init(|| FLUIDS.iter().copied().collect())
}

/// Coefficients of the named fluid.
///
/// # Errors
/// Will return `Err(EngineError::UnknownFluid)` if the name is not registered.
pub fn fluid_model(name: &str) -> Result<&'static FluidModel> {
    registry()
        .get(name)
        .ok_or_else(|| EngineError::UnknownFluid(name.to_string()))
}

/// Density (kg/m3) and kinematic viscosity (cSt) of the named fluid at `temperature` (degrees C).
///
/// # Errors
/// Will return `Err(EngineError::UnknownFluid)` if the name is not registered.
pub fn fluid_properties(temperature: f64, name: &str) -> Result<FluidProperties> {
    Ok(fluid_model(name)?.properties(temperature))
}

/// Registered fluid names in registration order.
pub fn fluid_names() -> impl Iterator<Item = &'static str> {
    registry().keys().copied()
}
