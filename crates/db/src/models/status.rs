//! Status and priority enums stored as TEXT columns.
//!
//! The wire and column spelling of each variant is the display label
//! (e.g. `"In Progress"`), matching the `CHECK` constraints in the
//! migrations.

macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident default $default:ident {
            $( $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, sqlx::Type,
        )]
        #[sqlx(type_name = "text")]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                #[sqlx(rename = $label)]
                $variant
            ),+
        }

        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The stored / serialized label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_text_enum! {
    /// Whether an employee or contractor is currently engaged.
    ActivityStatus default Active {
        Active => "Active",
        Inactive => "Inactive",
    }
}

define_text_enum! {
    /// Customer workflow stage.
    CustomerStatus default New {
        New => "New",
        Process => "Process",
        Correction => "Correction",
        Payment => "Payment",
        Finished => "Finished",
    }
}

define_text_enum! {
    TaskPriority default Medium {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

define_text_enum! {
    /// Task lifecycle status. `Completed` and `Cancelled` are closed.
    TaskStatus default Pending {
        Pending => "Pending",
        InProgress => "In Progress",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

impl TaskStatus {
    /// Closed tasks are never overdue.
    pub fn is_closed(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Cancelled)
    }
}
