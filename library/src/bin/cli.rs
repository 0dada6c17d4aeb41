use timing_core::TimingError;
use timing_core::run;

fn main() -> Result<(), TimingError> {
    env_logger::init();
    run(std::env::args().collect())
}
