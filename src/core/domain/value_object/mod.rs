mod proxmox_csrf_token;
mod proxmox_password;
mod proxmox_ticket;
mod proxmox_url;

pub use proxmox_csrf_token::ProxmoxCSRFToken;
pub use proxmox_ticket::ProxmoxTicket;
pub use proxmox_url::ProxmoxUrl;

// Re-export validation functions for internal use
pub(crate) use proxmox_password::validate_password_strength;
