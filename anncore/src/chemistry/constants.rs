// Purpose: To store monoisotopic constants that are used across the annotation pipeline
pub const MASS_PROTON: f64 = 1.007276466621; // Unified atomic mass unit
pub const MASS_WATER: f64 = 18.0105646863; // Unified atomic mass unit
pub const MASS_NH3: f64 = 17.026549101; // Unified atomic mass unit
pub const MASS_CO: f64 = 27.994914620; // Unified atomic mass unit
