/// Earth angular velocity, in WGS84 frame rad/s
pub const EARTH_ANGULAR_VEL_RAD: f64 = 7.2921151467E-5;

/// Earth gravitational constant (m^3 s-2)
pub const EARTH_GRAVITATION_MU_M3_S2: f64 = 3.986005E14;

/// WGS84 Earth Frame Ellipsoid semi-major axis
pub const EARTH_SEMI_MAJOR_AXIS_WGS84: f64 = 6378137.0_f64;

/// WGS84 Earth Frame Ellipsoid flattening
pub const EARTH_FLATTENING_WGS84: f64 = 1.0 / 298.257223563;

/// WGS84 first eccentricity squared
pub const EARTH_ECCENTRICITY_SQUARED_WGS84: f64 =
    2.0 * EARTH_FLATTENING_WGS84 - EARTH_FLATTENING_WGS84 * EARTH_FLATTENING_WGS84;

/// UTM central scale factor
pub const UTM_SCALE_FACTOR: f64 = 0.9996;

/// UTM false easting (m)
pub const UTM_FALSE_EASTING_M: f64 = 500_000.0;

/// UTM false northing, southern hemisphere (m)
pub const UTM_FALSE_NORTHING_SOUTH_M: f64 = 10_000_000.0;

/// Sentinel DOP value for degenerate geometries
pub const DOP_SENTINEL: f64 = 99.9;

/// Sentinel precision for sessions without any solution (m)
pub const NO_SOLUTION_SENTINEL: f64 = 999.0;

/// Continental default position (ECEF m), used when neither a previous solution
/// nor the header approximate position exist.
pub const CONTINENTAL_DEFAULT_ECEF_M: (f64, f64, f64) = (3752778.0, -4538402.0, -2442731.0);
