//! 시그널 엔진의 도메인 모델.

mod candle;
mod sensitivity;
mod signal;

pub use candle::*;
pub use sensitivity::*;
pub use signal::*;
