//! ABI bindings of the portal contracts.
//!
//! Only the methods used by the portal are declared here. Contract role codes
//! follow the `AdminPortal` enum: `0` none, `1` admin, `2` producer,
//! `3` distributor, `4` customer.

use alloy::sol;

sol! {
    #![sol(all_derives)]

    interface AdminPortal {
        struct Seed {
            string seedID;
            string cropName;
            string variety;
            string lotNumber;
            string certificationType;
            string tagNumber;
            uint256 quantity;
            uint256 pricePerUnit;
            string status;
        }

        function owner() external view returns (address);

        function addSeed(
            string seedID,
            string cropName,
            string variety,
            string lotNumber,
            string certificationType,
            string tagNumber,
            uint256 quantity,
            uint256 pricePerUnit
        ) external;

        function searchSeed(string seedID) external view returns (Seed memory);
        function seedList() external view returns (string[] memory);

        function getDashboardMetrics()
            external
            view
            returns (uint256 totalVarieties, uint256 totalQuantity, uint256 totalCost);

        function userList() external view returns (address[] memory);

        function users(address account)
            external
            view
            returns (string memory name, uint8 role, bool isActive);

        function addUser(address account, string name, uint8 role) external;
        function lockUnlockUser(address account, bool active) external;
    }

    interface UserPortal {
        struct Profile {
            string name;
            string email;
            string physicalAddress;
            string phone;
            uint256 registeredAt;
        }

        struct Purchase {
            uint256 purchaseId;
            string seedId;
            uint256 quantity;
            uint8 status;
            uint256 createdAt;
            uint256 updatedAt;
        }

        function registerUser(
            string name,
            string email,
            string physicalAddress,
            string phone
        ) external;

        function isRegistered(address account) external view returns (bool);
        function getProfile(address account) external view returns (Profile memory);

        function updateProfile(
            string name,
            string email,
            string physicalAddress,
            string phone
        ) external;

        function createPurchase(string seedId, uint256 quantity) external returns (uint256 purchaseId);
        function cancelPurchase(uint256 purchaseId) external;
        function getPurchases(address buyer) external view returns (Purchase[] memory);
    }
}
