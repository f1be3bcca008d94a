//! RMI Driver - command dispatch for Robot Movement Interface messages
//!
//! This library maps RMI command messages onto a robot controller's textual
//! protocol. It does no I/O of its own: the host owns the socket to the
//! controller and feeds messages in, telegrams out.
//!
//! # Quick Start
//!
//! ```rust
//! use rmi_driver::{Command, CommandRegister, RmiCommand, util::params_to_string};
//!
//! let mut register = CommandRegister::new();
//! register.add_handler(
//!     "ptp_joints",
//!     RmiCommand::with_type("PTP").pose_type("JOINTS"),
//!     |msg| Command::motion("ptp", params_to_string(&msg.pose, 4)).with_id(msg.command_id),
//! );
//!
//! let msg = RmiCommand::with_type("PTP")
//!     .pose_type("JOINTS")
//!     .pose(vec![0.0, 1.5, -2.0, 0.0, 0.0, 0.0])
//!     .id(7);
//!
//! let cmd = register.process(&msg).unwrap();
//! assert_eq!(cmd.to_telegram(true), "ptp : 0 1.5 -2 0 0 0;\n");
//! assert!(cmd.check_response("done"));
//! ```
//!
//! # Architecture
//!
//! - **RmiCommand**: upstream message; empty fields are "not set"
//! - **CommandHandler**: sample message + transform; empty sample fields are wildcards
//! - **CommandRegister**: ordered handler table, first match wins
//! - **Command**: ordered keyword/value entries rendered as one telegram
//! - **TelegramParser**: splits a telegram back into its entries

pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod json_output;
pub mod message;
pub mod register;
pub mod telegram;
pub mod util;

pub use command::{Command, CommandType, ERROR_REPLY};
pub use config::{DriverConfig, FormattingConfig, LoggingConfig};
pub use error::{Result, RmiError};
pub use handler::{CommandHandler, SampleHandler, TransformFn};
pub use message::{RmiCommand, RmiCommandList};
pub use register::{CommandRegister, Dispatch, HandlerCatalog};
pub use telegram::{parse_telegram, TelegramParser};
