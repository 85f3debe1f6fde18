pub mod pauli;
pub use pauli::{PauliParseError, PauliString};

pub mod tableau;
pub use tableau::Tableau;

pub mod transposed;
pub use transposed::TransposedTableau;

pub mod gates;
pub use gates::{GateDef, gate, gate_names};
