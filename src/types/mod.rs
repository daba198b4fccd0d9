mod time_spec;
pub use time_spec::TimeSpec;

mod gpio_attr;
pub use gpio_attr::GpioAttr;

mod dio_line;
pub use dio_line::{DioLine, Edge};

mod timed_command;
pub use timed_command::TimedCommand;

mod rxfe_settings;
pub use rxfe_settings::{RxfeSettings, RxfeStage, AMP_GAIN_DB, MAX_ATTENUATION_DB};
