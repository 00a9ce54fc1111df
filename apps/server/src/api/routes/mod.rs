pub mod pacientes;

pub use pacientes::patient_routes;
