pub(crate) const G_CM3_TO_KG_M3: f64 = 1000.0;
pub const MHZ_TO_HZ: f64 = 1e6;
pub const US_TO_S: f64 = 1e-6;
