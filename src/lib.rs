#![no_std]

/// Driver for the kit's DHT11 humidity/temperature sensor, including the
/// single-wire pulse-timed protocol decoder.
pub mod dht11;
/// Utilities for reading distance from HC-SR04 style ultrasonic rangers.
pub mod hcsr04;
/// The pulse-timing hardware abstraction shared by the drivers.
pub mod line;
