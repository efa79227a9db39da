pub mod init;
pub mod practice;
pub mod review;
pub mod roles;
pub mod weak_spots;
