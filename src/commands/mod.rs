// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod appointments;
pub mod calendar;
pub mod clients;
pub mod doctor;
pub mod finance;
pub mod settings;
