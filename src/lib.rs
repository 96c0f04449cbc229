pub mod errors;
pub mod linalg;
pub mod mask;
pub mod nystrom;
pub mod leverage;
pub mod sample;
pub mod select;
pub mod adaptive;
pub mod leverage_select;
pub mod determinantal;
pub mod frobenius;
pub mod growth;
pub mod io;
#[cfg(test)]
pub mod test_assist;
