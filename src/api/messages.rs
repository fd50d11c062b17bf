//! User-facing notification texts.

// Failures
pub const SESSION_EXPIRED: &str = "Phiên làm việc đã hết hạn";
pub const FORBIDDEN: &str = "Bạn không có quyền truy cập";
pub const NOT_FOUND: &str = "Không tìm thấy dữ liệu yêu cầu";
pub const SERVER_ERROR: &str = "Lỗi máy chủ, vui lòng thử lại sau";
pub const CONNECTION_ERROR: &str = "Lỗi kết nối, vui lòng thử lại";
pub const GENERIC_ERROR: &str = "Đã xảy ra lỗi khi xử lý yêu cầu";

// Mutations
pub const CREATE_SUCCESS: &str = "Thêm mới thành công";
pub const UPDATE_SUCCESS: &str = "Cập nhật thành công";
pub const DELETE_SUCCESS: &str = "Xóa thành công";
pub const UPLOAD_SUCCESS: &str = "Tải lên thành công";

// Session
pub const LOGIN_SUCCESS: &str = "Đăng nhập thành công";
pub const LOGIN_ERROR: &str = "Đăng nhập thất bại";
pub const LOGOUT_SUCCESS: &str = "Đăng xuất thành công";
pub const PASSWORD_CHANGE_SUCCESS: &str = "Thay đổi mật khẩu thành công";
pub const PASSWORD_CHANGE_ERROR: &str = "Thay đổi mật khẩu thất bại";

// Records
pub const LICENSE_SAVED: &str = "Lưu thông tin giấy phép thành công";
pub const LICENSE_DELETED: &str = "Xóa giấy phép thành công";
pub const LICENSE_APPROVED: &str = "Phê duyệt giấy phép thành công";
pub const LICENSE_APPROVAL_CANCELLED: &str = "Hủy phê duyệt giấy phép thành công";
pub const CONSTRUCTION_SAVED: &str = "Lưu thông tin công trình thành công";
pub const CONSTRUCTION_DELETED: &str = "Xóa công trình thành công";
pub const ACCOUNT_ACTIVATED: &str = "Kích hoạt tài khoản kết nối thành công";
pub const ACCOUNT_DEACTIVATED: &str = "Hủy kích hoạt tài khoản kết nối thành công";
