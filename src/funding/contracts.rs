//! On-chain interfaces of the funding infrastructure

use alloy::sol;

sol! {
    /// One transfer performed when a drip fires.
    #[derive(Debug)]
    struct DripAction {
        address target;
        bytes data;
        uint256 value;
    }

    /// Parameters of a funding rule.
    #[derive(Debug)]
    struct DripConfig {
        bool reentrant;
        uint256 interval;
        address dripcheck;
        bytes checkparams;
        DripAction[] actions;
    }

    interface IDripController {
        function dripStatus(string memory name) external view returns (uint8);
        function create(string memory name, DripConfig memory config) external;
        function setStatus(string memory name, uint8 status) external;
    }

    interface IAccessControl {
        function hasRole(bytes32 role, address account) external view returns (bool);
        function grantRole(bytes32 role, address account) external;
    }
}
