//! Property-based tests for Modbus reply decoding.

use proptest::prelude::*;
use spraykit_communication::modbus::{decode_response, Request};
use spraykit_communication::{float_to_registers, registers_to_float};

fn arb_request() -> impl Strategy<Value = Request> {
    prop_oneof![
        (any::<u16>(), 1..125u16)
            .prop_map(|(address, count)| Request::ReadHoldingRegisters { address, count }),
        (any::<u16>(), any::<u16>())
            .prop_map(|(address, value)| Request::WriteSingleRegister { address, value }),
        (any::<u16>(), prop::collection::vec(any::<u16>(), 1..123))
            .prop_map(|(address, values)| Request::WriteMultipleRegisters { address, values }),
    ]
}

proptest! {
    #[test]
    fn decoding_arbitrary_replies_never_panics(
        request in arb_request(),
        pdu in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let _ = decode_response(&request, &pdu);
    }

    #[test]
    fn finite_floats_survive_word_swap(value in prop::num::f32::NORMAL | prop::num::f32::ZERO) {
        prop_assert_eq!(registers_to_float(float_to_registers(value)), value);
    }
}
