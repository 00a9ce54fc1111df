pub mod health;
pub mod pacientes;
