// chemistry module
pub mod chemistry {
    pub mod amino_acid;
    pub mod constants;
    pub mod unimod;
}

// data module
pub mod data {
    pub mod peptide;
    pub mod spectrum;
}

// algorithm module
pub mod algorithm {
    pub mod annotate;
    pub mod fragment;
}

pub mod errors;
