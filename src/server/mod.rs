//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Transporte del servidor:
//! 1. Escucha en un puerto (`tcp`)
//! 2. Entrega cada conexión aceptada a un pool fijo de workers (`pool`)
//! 3. Lee el request completo, lo despacha y escribe la respuesta
//!    (`connection`)

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
